//! # In-Memory Catalog Backend
//!
//! Used when no `DATABASE_URL` is configured (development, tests). Mirrors
//! the Postgres schema: identifiers are assigned from per-table counters,
//! association pairs are unique, and deletes cascade the way the foreign
//! keys do.
//!
//! All four tables sit behind one `parking_lot::RwLock` so cascades and
//! existence checks see a consistent snapshot. The lock is never held
//! across `.await`.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use parking_lot::RwLock;
use totem_core::{
    next_sort_order, sort_modulos, AssociationFilter, Modulo, ModuloInput, NewRequisito,
    Requisito, RequisitoFilter, RequisitoUpdate, Tramite, TramiteDetail, TramiteInput,
    TramiteModulo,
};

use crate::catalog::CatalogError;

#[derive(Debug, Default)]
struct Tables {
    tramites: BTreeMap<i64, Tramite>,
    modulos: BTreeMap<i64, Modulo>,
    requisitos: BTreeMap<i64, Requisito>,
    links: BTreeSet<TramiteModulo>,
    last_tramite_id: i64,
    last_modulo_id: i64,
    last_requisito_id: i64,
}

impl Tables {
    fn requisitos_of(&self, tramite_id: i64) -> Vec<Requisito> {
        let mut list: Vec<Requisito> = self
            .requisitos
            .values()
            .filter(|r| r.tramite_id == tramite_id)
            .cloned()
            .collect();
        list.sort_by_key(|r| (r.sort_order, r.id));
        list
    }
}

/// Shared in-memory catalog. Clones see the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Tramites -------------------------------------------------------------

    pub fn list_tramites(&self) -> Vec<Tramite> {
        self.tables.read().tramites.values().cloned().collect()
    }

    pub fn get_tramite(&self, id: i64) -> Option<TramiteDetail> {
        let tables = self.tables.read();
        let tramite = tables.tramites.get(&id)?.clone();
        let mut modulos: Vec<Modulo> = tables
            .links
            .iter()
            .filter(|link| link.tramite_id == id)
            .filter_map(|link| tables.modulos.get(&link.modulo_id).cloned())
            .collect();
        sort_modulos(&mut modulos);
        Some(TramiteDetail {
            tramite,
            requisitos: tables.requisitos_of(id),
            modulos,
        })
    }

    pub fn create_tramite(&self, input: &TramiteInput) -> Tramite {
        let mut tables = self.tables.write();
        tables.last_tramite_id += 1;
        let tramite = Tramite {
            id: tables.last_tramite_id,
            titulo: input.titulo.clone(),
            icono: input.icono.clone(),
        };
        tables.tramites.insert(tramite.id, tramite.clone());
        tramite
    }

    pub fn update_tramite(&self, id: i64, input: &TramiteInput) -> Option<Tramite> {
        let mut tables = self.tables.write();
        let tramite = tables.tramites.get_mut(&id)?;
        tramite.titulo = input.titulo.clone();
        tramite.icono = input.icono.clone();
        Some(tramite.clone())
    }

    /// Remove a procedure with its requirements and associations.
    pub fn delete_tramite(&self, id: i64) -> Option<Tramite> {
        let mut tables = self.tables.write();
        let removed = tables.tramites.remove(&id)?;
        tables.requisitos.retain(|_, r| r.tramite_id != id);
        tables.links.retain(|link| link.tramite_id != id);
        Some(removed)
    }

    // -- Modulos --------------------------------------------------------------

    pub fn list_modulos(&self) -> Vec<Modulo> {
        let mut list: Vec<Modulo> = self.tables.read().modulos.values().cloned().collect();
        sort_modulos(&mut list);
        list
    }

    pub fn get_modulo(&self, id: i64) -> Option<Modulo> {
        self.tables.read().modulos.get(&id).cloned()
    }

    pub fn create_modulo(&self, input: &ModuloInput) -> Modulo {
        let mut tables = self.tables.write();
        tables.last_modulo_id += 1;
        let modulo = Modulo {
            id: tables.last_modulo_id,
            nombre: input.nombre.clone(),
            numero: input.numero.clone(),
            piso: input.piso.clone(),
            icono: input.icono.clone(),
        };
        tables.modulos.insert(modulo.id, modulo.clone());
        modulo
    }

    pub fn update_modulo(&self, id: i64, input: &ModuloInput) -> Option<Modulo> {
        let mut tables = self.tables.write();
        let modulo = tables.modulos.get_mut(&id)?;
        modulo.nombre = input.nombre.clone();
        modulo.numero = input.numero.clone();
        modulo.piso = input.piso.clone();
        modulo.icono = input.icono.clone();
        Some(modulo.clone())
    }

    /// Remove a counter and its associations.
    pub fn delete_modulo(&self, id: i64) -> Option<Modulo> {
        let mut tables = self.tables.write();
        let removed = tables.modulos.remove(&id)?;
        tables.links.retain(|link| link.modulo_id != id);
        Some(removed)
    }

    // -- Requisitos -----------------------------------------------------------

    pub fn list_requisitos(&self, filter: RequisitoFilter) -> Vec<Requisito> {
        let tables = self.tables.read();
        match filter.tramite_id {
            Some(tramite_id) => tables.requisitos_of(tramite_id),
            None => {
                let mut list: Vec<Requisito> = tables.requisitos.values().cloned().collect();
                list.sort_by_key(|r| (r.tramite_id, r.sort_order, r.id));
                list
            }
        }
    }

    pub fn get_requisito(&self, id: i64) -> Option<Requisito> {
        self.tables.read().requisitos.get(&id).cloned()
    }

    /// Append a requirement after the procedure's last one.
    pub fn create_requisito(&self, input: &NewRequisito) -> Result<Requisito, CatalogError> {
        let mut tables = self.tables.write();
        if !tables.tramites.contains_key(&input.tramite_id) {
            return Err(CatalogError::NotFound(format!(
                "tramite {}",
                input.tramite_id
            )));
        }
        let sort_order = next_sort_order(
            tables
                .requisitos
                .values()
                .filter(|r| r.tramite_id == input.tramite_id)
                .map(|r| r.sort_order),
        );
        tables.last_requisito_id += 1;
        let requisito = Requisito {
            id: tables.last_requisito_id,
            tramite_id: input.tramite_id,
            texto: input.texto.clone(),
            sort_order,
        };
        tables.requisitos.insert(requisito.id, requisito.clone());
        Ok(requisito)
    }

    pub fn update_requisito(&self, id: i64, input: &RequisitoUpdate) -> Option<Requisito> {
        let mut tables = self.tables.write();
        let requisito = tables.requisitos.get_mut(&id)?;
        requisito.texto = input.texto.clone();
        if let Some(order) = input.sort_order {
            requisito.sort_order = order;
        }
        Some(requisito.clone())
    }

    pub fn delete_requisito(&self, id: i64) -> bool {
        self.tables.write().requisitos.remove(&id).is_some()
    }

    // -- Associations ---------------------------------------------------------

    pub fn list_associations(&self, filter: AssociationFilter) -> Vec<TramiteModulo> {
        self.tables
            .read()
            .links
            .iter()
            .filter(|link| filter.matches(link))
            .copied()
            .collect()
    }

    pub fn get_association(&self, link: TramiteModulo) -> Option<TramiteModulo> {
        self.tables.read().links.get(&link).copied()
    }

    pub fn create_association(&self, link: TramiteModulo) -> Result<TramiteModulo, CatalogError> {
        let mut tables = self.tables.write();
        if !tables.tramites.contains_key(&link.tramite_id) {
            return Err(CatalogError::NotFound(format!("tramite {}", link.tramite_id)));
        }
        if !tables.modulos.contains_key(&link.modulo_id) {
            return Err(CatalogError::NotFound(format!("modulo {}", link.modulo_id)));
        }
        if !tables.links.insert(link) {
            return Err(CatalogError::Conflict(format!(
                "tramite {} is already attended at modulo {}",
                link.tramite_id, link.modulo_id
            )));
        }
        Ok(link)
    }

    pub fn delete_association(&self, link: TramiteModulo) -> bool {
        self.tables.write().links.remove(&link)
    }
}
