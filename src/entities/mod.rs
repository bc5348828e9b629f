//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod app_state;
pub mod farm;
pub mod irrigation_log;
pub mod user;
pub mod weather_snapshot;

// Re-export specific types to avoid conflicts
pub use app_state::{Column as AppStateColumn, Entity as AppState, Model as AppStateModel};
pub use farm::{Column as FarmColumn, Entity as Farm, Model as FarmModel};
pub use irrigation_log::{
    Column as IrrigationLogColumn, Entity as IrrigationLog, Model as IrrigationLogModel,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
pub use weather_snapshot::{
    Column as WeatherSnapshotColumn, Entity as WeatherSnapshot, Model as WeatherSnapshotModel,
};
