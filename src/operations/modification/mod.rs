mod delete;

pub use delete::DeleteParts;
