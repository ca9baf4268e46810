//! SurrealDB repository implementations.

mod principal;
mod todo;

pub use principal::SurrealPrincipalRepository;
pub use todo::SurrealTodoRepository;
