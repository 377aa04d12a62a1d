//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Steps that must share a
//! caller-owned transaction take `&mut PgConnection` instead.

pub mod activity_repo;
pub mod notification_repo;
pub mod pricing_repo;
pub mod project_material_repo;
pub mod project_repo;
pub mod user_repo;
pub mod warehouse_material_repo;
pub mod warehouse_repo;

pub use activity_repo::ActivityRepo;
pub use notification_repo::NotificationRepo;
pub use pricing_repo::PricingConfigRepo;
pub use project_material_repo::ProjectMaterialRepo;
pub use project_repo::ProjectRepo;
pub use user_repo::UserRepo;
pub use warehouse_material_repo::WarehouseMaterialRepo;
pub use warehouse_repo::WarehouseRepo;
