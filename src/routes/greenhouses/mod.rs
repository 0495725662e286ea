mod handlers;
mod types;

pub use handlers::{
    create_greenhouse, delete_greenhouse, get_greenhouse, list_greenhouses, rename_greenhouse,
};
pub use types::{GreenhouseRequest, GreenhouseResponse};

// Re-export utoipa path structs for OpenAPI documentation
pub use handlers::{
    __path_create_greenhouse, __path_delete_greenhouse, __path_get_greenhouse,
    __path_list_greenhouses, __path_rename_greenhouse,
};
