//! # Catalog Records
//!
//! The four catalog tables and the inputs that write them:
//!
//! | Record | Table | Key |
//! |--------|-------|-----|
//! | [`Tramite`] | `tramites` | `id` |
//! | [`Modulo`] | `modulos` | `id` |
//! | [`Requisito`] | `requisitos` | `id`, belongs to a tramite |
//! | [`TramiteModulo`] | `tramite_modulo` | `(tramite_id, modulo_id)` |
//!
//! Inputs are normalized before they reach storage: surrounding whitespace
//! is trimmed and blank optional fields become `None`.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::ValidationError;

/// Maximum length of short text fields (titles, names, icon filenames).
pub const MAX_NAME_LEN: usize = 255;

/// Maximum length of a requirement line.
pub const MAX_TEXTO_LEN: usize = 2000;

// -- Records ------------------------------------------------------------------

/// An administrative procedure offered by the office.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Tramite {
    pub id: i64,
    pub titulo: String,
    /// Icon filename under `/icons/`.
    pub icono: Option<String>,
}

/// A procedure with its requirements and the counters that attend it.
///
/// Serialized flat: the procedure fields sit next to `requisitos` and `modulos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TramiteDetail {
    #[serde(flatten)]
    pub tramite: Tramite,
    /// Ordered by `sort_order`, then `id`.
    pub requisitos: Vec<Requisito>,
    /// Ordered by [`crate::modulo_order`].
    pub modulos: Vec<Modulo>,
}

/// A physical service counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Modulo {
    pub id: i64,
    pub nombre: String,
    /// Counter label, e.g. `"Módulo 3"`.
    pub numero: Option<String>,
    /// Floor label, e.g. `"Planta baja"`.
    pub piso: Option<String>,
    pub icono: Option<String>,
}

/// One requirement line of a procedure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Requisito {
    pub id: i64,
    pub tramite_id: i64,
    pub texto: String,
    pub sort_order: i32,
}

/// Association between a procedure and a counter that attends it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
pub struct TramiteModulo {
    pub tramite_id: i64,
    pub modulo_id: i64,
}

impl TramiteModulo {
    /// Reject non-positive identifiers.
    pub fn check(&self) -> Result<(), ValidationError> {
        positive_id("tramite_id", self.tramite_id)?;
        positive_id("modulo_id", self.modulo_id)
    }
}

// -- Write inputs -------------------------------------------------------------

/// Create or replace a procedure.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
pub struct TramiteInput {
    pub titulo: String,
    #[serde(default)]
    pub icono: Option<String>,
}

impl TramiteInput {
    pub fn check(&self) -> Result<(), ValidationError> {
        required_text("titulo", &self.titulo, MAX_NAME_LEN)?;
        optional_text("icono", self.icono.as_deref(), MAX_NAME_LEN)
    }

    /// Trim text and collapse a blank icon to `None`.
    pub fn normalized(self) -> Self {
        Self {
            titulo: self.titulo.trim().to_string(),
            icono: blank_to_none(self.icono),
        }
    }
}

/// Create or replace a counter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
pub struct ModuloInput {
    pub nombre: String,
    #[serde(default)]
    pub numero: Option<String>,
    #[serde(default)]
    pub piso: Option<String>,
    #[serde(default)]
    pub icono: Option<String>,
}

impl ModuloInput {
    pub fn check(&self) -> Result<(), ValidationError> {
        required_text("nombre", &self.nombre, MAX_NAME_LEN)?;
        optional_text("numero", self.numero.as_deref(), MAX_NAME_LEN)?;
        optional_text("piso", self.piso.as_deref(), MAX_NAME_LEN)?;
        optional_text("icono", self.icono.as_deref(), MAX_NAME_LEN)
    }

    pub fn normalized(self) -> Self {
        Self {
            nombre: self.nombre.trim().to_string(),
            numero: blank_to_none(self.numero),
            piso: blank_to_none(self.piso),
            icono: blank_to_none(self.icono),
        }
    }
}

/// Append a requirement to a procedure. The sort order is assigned by storage.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
pub struct NewRequisito {
    pub tramite_id: i64,
    pub texto: String,
}

impl NewRequisito {
    pub fn check(&self) -> Result<(), ValidationError> {
        positive_id("tramite_id", self.tramite_id)?;
        required_text("texto", &self.texto, MAX_TEXTO_LEN)
    }

    pub fn normalized(self) -> Self {
        Self {
            tramite_id: self.tramite_id,
            texto: self.texto.trim().to_string(),
        }
    }
}

/// Edit a requirement. An absent `sort_order` keeps the stored one.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
pub struct RequisitoUpdate {
    pub texto: String,
    #[serde(default)]
    pub sort_order: Option<i32>,
}

impl RequisitoUpdate {
    pub fn check(&self) -> Result<(), ValidationError> {
        required_text("texto", &self.texto, MAX_TEXTO_LEN)?;
        match self.sort_order {
            Some(order) if order < 0 => Err(ValidationError::Negative {
                field: "sort_order",
            }),
            _ => Ok(()),
        }
    }

    pub fn normalized(self) -> Self {
        Self {
            texto: self.texto.trim().to_string(),
            sort_order: self.sort_order,
        }
    }
}

// -- Filters ------------------------------------------------------------------

/// Requirement list filter. Doubles as the requirement cache key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RequisitoFilter {
    /// Restrict to the requirements of one procedure.
    pub tramite_id: Option<i64>,
}

/// Association list filter. Doubles as the association cache key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AssociationFilter {
    pub tramite_id: Option<i64>,
    pub modulo_id: Option<i64>,
}

impl AssociationFilter {
    /// Whether the association passes this filter.
    pub fn matches(&self, link: &TramiteModulo) -> bool {
        self.tramite_id.map_or(true, |t| t == link.tramite_id)
            && self.modulo_id.map_or(true, |m| m == link.modulo_id)
    }
}

// -- Field rules --------------------------------------------------------------

fn required_text(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if trimmed.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

fn optional_text(field: &'static str, value: Option<&str>, max: usize) -> Result<(), ValidationError> {
    match value {
        Some(v) if v.trim().chars().count() > max => Err(ValidationError::TooLong { field, max }),
        _ => Ok(()),
    }
}

fn positive_id(field: &'static str, id: i64) -> Result<(), ValidationError> {
    if id > 0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidId { field })
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
