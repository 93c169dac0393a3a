//! Core module - fundamental types and utilities

pub mod catalog;
pub mod config;
pub mod hierarchy;
pub mod matrix;
pub mod selection;
pub mod workspace;

pub use catalog::{Catalog, CatalogError};
pub use config::Config;
pub use hierarchy::Tier;
pub use matrix::{score, MatrixError, Rating, RiskBand, RiskMatrix};
pub use selection::{
    ControlScope, ControlSession, HazardSession, PersonnelSession, SelectionError,
};
pub use workspace::{TaskPatch, Workspace, WorkspaceError};
