//! # totem-core — Domain Types for the Procedure Catalog
//!
//! Foundational types shared by the catalog service and its front-ends.
//! A notary office publishes a catalog of procedures (trámites), each with
//! an ordered list of free-text requirements (requisitos) and the service
//! counters (módulos) that attend it.
//!
//! ## Contents
//!
//! - [`records`] — catalog records, write inputs, query filters and their
//!   validation rules.
//! - [`ordering`] — canonical counter ordering and requirement sort-order
//!   assignment.
//! - [`cache`] — the time-boxed read cache placed in front of catalog queries.
//! - [`kiosk`] — the public kiosk model: pagination, modal auto-close timer,
//!   and the periodic voice guide.
//!
//! ## Crate Policy
//!
//! - No I/O. Storage, HTTP and file handling live in `totem-api`.
//! - No `.unwrap()` outside tests.
//! - All public records derive `Debug`, `Clone`, `Serialize`/`Deserialize`.

pub mod cache;
pub mod error;
pub mod kiosk;
pub mod ordering;
pub mod records;

pub use cache::{Generation, TtlCache};
pub use error::ValidationError;
pub use kiosk::{GuideLoop, KioskSettings, ModalTimer, NavButtons, Pager, SpeechSettings};
pub use ordering::{modulo_order, next_sort_order, sort_modulos};
pub use records::{
    AssociationFilter, Modulo, ModuloInput, NewRequisito, Requisito, RequisitoFilter,
    RequisitoUpdate, Tramite, TramiteDetail, TramiteInput, TramiteModulo,
};
