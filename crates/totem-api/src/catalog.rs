//! # Catalog Service
//!
//! Every catalog read and write goes through [`Catalog`]. It picks the
//! storage backend (Postgres or in-memory), normalizes and validates
//! inputs, keeps short-lived read caches in front of the backend, and
//! drops the affected caches after each successful write:
//!
//! | Write | Caches cleared |
//! |-------|----------------|
//! | tramite create / update | tramites |
//! | tramite delete | tramites, requisitos, associations |
//! | modulo create / update | modulos, tramites |
//! | modulo delete | modulos, tramites, associations |
//! | requisito write | requisitos, tramites |
//! | association write | associations, tramites |
//!
//! "tramites" covers both the list and the per-id detail cache, since a
//! detail embeds requirements and counters.
//!
//! Deleting a record that carried an icon also removes the icon file.

use std::hash::Hash;

use sqlx::PgPool;
use thiserror::Error;
use totem_core::{
    sort_modulos, AssociationFilter, Modulo, ModuloInput, NewRequisito, Requisito,
    RequisitoFilter, RequisitoUpdate, Tramite, TramiteDetail, TramiteInput, TramiteModulo,
    TtlCache, ValidationError,
};

use crate::config::CacheTtls;
use crate::db;
use crate::icons::IconStore;
use crate::memory::MemoryCatalog;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("{0} not found")]
    NotFound(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Map constraint violations on a write to domain errors.
fn classify(err: sqlx::Error, conflict: impl FnOnce() -> String, missing: impl FnOnce() -> String) -> CatalogError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return CatalogError::Conflict(conflict());
        }
        if db_err.is_foreign_key_violation() {
            return CatalogError::NotFound(missing());
        }
    }
    CatalogError::Database(err)
}

#[derive(Debug, Clone)]
enum Backend {
    Memory(MemoryCatalog),
    Postgres(PgPool),
}

/// Cached catalog service. Cheap to clone; clones share caches and storage.
#[derive(Debug, Clone)]
pub struct Catalog {
    backend: Backend,
    icons: IconStore,
    tramites: TtlCache<(), Vec<Tramite>>,
    tramite_details: TtlCache<i64, TramiteDetail>,
    modulos: TtlCache<(), Vec<Modulo>>,
    requisitos: TtlCache<RequisitoFilter, Vec<Requisito>>,
    associations: TtlCache<AssociationFilter, Vec<TramiteModulo>>,
}

/// Look `key` up in `cache`, counting hits and misses under `name`.
fn lookup<K: Eq + Hash, V: Clone>(cache: &TtlCache<K, V>, name: &'static str, key: &K) -> Option<V> {
    let found = cache.get(key);
    let outcome = if found.is_some() { "hit" } else { "miss" };
    metrics::counter!("totem_cache_lookups_total", "cache" => name, "outcome" => outcome)
        .increment(1);
    found
}

impl Catalog {
    /// Postgres-backed when `pool` is given, in-memory otherwise.
    pub fn new(pool: Option<PgPool>, ttls: CacheTtls, icons: IconStore) -> Self {
        let backend = match pool {
            Some(pool) => Backend::Postgres(pool),
            None => Backend::Memory(MemoryCatalog::new()),
        };
        Self {
            backend,
            icons,
            tramites: TtlCache::new(ttls.tramites),
            tramite_details: TtlCache::new(ttls.tramites),
            modulos: TtlCache::new(ttls.modulos),
            requisitos: TtlCache::new(ttls.requisitos),
            associations: TtlCache::new(ttls.associations),
        }
    }

    /// In-memory catalog with the given cache TTLs.
    pub fn in_memory(ttls: CacheTtls, icons: IconStore) -> Self {
        Self::new(None, ttls, icons)
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self.backend, Backend::Postgres(_))
    }

    pub fn icons(&self) -> &IconStore {
        &self.icons
    }

    // -- Invalidation ---------------------------------------------------------

    fn invalidate_tramites(&self) {
        self.tramites.clear();
        self.tramite_details.clear();
        tracing::debug!("tramite caches invalidated");
    }

    fn invalidate_modulos(&self) {
        self.modulos.clear();
        tracing::debug!("modulo cache invalidated");
    }

    fn invalidate_requisitos(&self) {
        self.requisitos.clear();
        tracing::debug!("requisito cache invalidated");
    }

    fn invalidate_associations(&self) {
        self.associations.clear();
        tracing::debug!("association cache invalidated");
    }

    async fn drop_icon(&self, icono: Option<&str>) {
        if let Some(name) = icono {
            self.icons.remove_quietly(name).await;
        }
    }

    // -- Tramites -------------------------------------------------------------

    /// All procedures ordered by id.
    pub async fn list_tramites(&self) -> Result<Vec<Tramite>, CatalogError> {
        let seen = self.tramites.generation();
        if let Some(list) = lookup(&self.tramites, "tramites", &()) {
            return Ok(list);
        }
        let list = match &self.backend {
            Backend::Memory(mem) => mem.list_tramites(),
            Backend::Postgres(pool) => db::tramites::list(pool).await?,
        };
        self.tramites.insert_if_current((), list.clone(), seen);
        Ok(list)
    }

    /// A procedure with its requirements and counters.
    pub async fn get_tramite(&self, id: i64) -> Result<Option<TramiteDetail>, CatalogError> {
        let seen = self.tramite_details.generation();
        if let Some(detail) = lookup(&self.tramite_details, "tramite_detail", &id) {
            return Ok(Some(detail));
        }
        let detail = match &self.backend {
            Backend::Memory(mem) => mem.get_tramite(id),
            Backend::Postgres(pool) => match db::tramites::get(pool, id).await? {
                None => None,
                Some(tramite) => {
                    let requisitos = db::requisitos::list(
                        pool,
                        RequisitoFilter {
                            tramite_id: Some(id),
                        },
                    )
                    .await?;
                    let mut modulos = db::modulos::list_for_tramite(pool, id).await?;
                    sort_modulos(&mut modulos);
                    Some(TramiteDetail {
                        tramite,
                        requisitos,
                        modulos,
                    })
                }
            },
        };
        if let Some(detail) = &detail {
            self.tramite_details.insert_if_current(id, detail.clone(), seen);
        }
        Ok(detail)
    }

    pub async fn create_tramite(&self, input: TramiteInput) -> Result<Tramite, CatalogError> {
        input.check()?;
        let input = input.normalized();
        let tramite = match &self.backend {
            Backend::Memory(mem) => mem.create_tramite(&input),
            Backend::Postgres(pool) => db::tramites::insert(pool, &input).await?,
        };
        self.invalidate_tramites();
        tracing::info!(tramite_id = tramite.id, titulo = %tramite.titulo, "tramite created");
        Ok(tramite)
    }

    pub async fn update_tramite(
        &self,
        id: i64,
        input: TramiteInput,
    ) -> Result<Option<Tramite>, CatalogError> {
        input.check()?;
        let input = input.normalized();
        let updated = match &self.backend {
            Backend::Memory(mem) => mem.update_tramite(id, &input),
            Backend::Postgres(pool) => db::tramites::update(pool, id, &input).await?,
        };
        if updated.is_some() {
            self.invalidate_tramites();
            tracing::info!(tramite_id = id, "tramite updated");
        }
        Ok(updated)
    }

    /// Delete a procedure with its requirements and associations.
    pub async fn delete_tramite(&self, id: i64) -> Result<bool, CatalogError> {
        let removed = match &self.backend {
            Backend::Memory(mem) => mem.delete_tramite(id),
            Backend::Postgres(pool) => db::tramites::delete(pool, id).await?,
        };
        let Some(tramite) = removed else {
            return Ok(false);
        };
        self.invalidate_tramites();
        self.invalidate_requisitos();
        self.invalidate_associations();
        self.drop_icon(tramite.icono.as_deref()).await;
        tracing::info!(tramite_id = id, "tramite deleted");
        Ok(true)
    }

    // -- Modulos --------------------------------------------------------------

    /// All counters in canonical counter order.
    pub async fn list_modulos(&self) -> Result<Vec<Modulo>, CatalogError> {
        let seen = self.modulos.generation();
        if let Some(list) = lookup(&self.modulos, "modulos", &()) {
            return Ok(list);
        }
        let list = match &self.backend {
            Backend::Memory(mem) => mem.list_modulos(),
            Backend::Postgres(pool) => {
                let mut list = db::modulos::list(pool).await?;
                sort_modulos(&mut list);
                list
            }
        };
        self.modulos.insert_if_current((), list.clone(), seen);
        Ok(list)
    }

    pub async fn get_modulo(&self, id: i64) -> Result<Option<Modulo>, CatalogError> {
        Ok(match &self.backend {
            Backend::Memory(mem) => mem.get_modulo(id),
            Backend::Postgres(pool) => db::modulos::get(pool, id).await?,
        })
    }

    pub async fn create_modulo(&self, input: ModuloInput) -> Result<Modulo, CatalogError> {
        input.check()?;
        let input = input.normalized();
        let modulo = match &self.backend {
            Backend::Memory(mem) => mem.create_modulo(&input),
            Backend::Postgres(pool) => db::modulos::insert(pool, &input).await?,
        };
        self.invalidate_modulos();
        self.invalidate_tramites();
        tracing::info!(modulo_id = modulo.id, nombre = %modulo.nombre, "modulo created");
        Ok(modulo)
    }

    pub async fn update_modulo(
        &self,
        id: i64,
        input: ModuloInput,
    ) -> Result<Option<Modulo>, CatalogError> {
        input.check()?;
        let input = input.normalized();
        let updated = match &self.backend {
            Backend::Memory(mem) => mem.update_modulo(id, &input),
            Backend::Postgres(pool) => db::modulos::update(pool, id, &input).await?,
        };
        if updated.is_some() {
            self.invalidate_modulos();
            self.invalidate_tramites();
            tracing::info!(modulo_id = id, "modulo updated");
        }
        Ok(updated)
    }

    /// Delete a counter and its associations.
    pub async fn delete_modulo(&self, id: i64) -> Result<bool, CatalogError> {
        let removed = match &self.backend {
            Backend::Memory(mem) => mem.delete_modulo(id),
            Backend::Postgres(pool) => db::modulos::delete(pool, id).await?,
        };
        let Some(modulo) = removed else {
            return Ok(false);
        };
        self.invalidate_modulos();
        self.invalidate_tramites();
        self.invalidate_associations();
        self.drop_icon(modulo.icono.as_deref()).await;
        tracing::info!(modulo_id = id, "modulo deleted");
        Ok(true)
    }

    // -- Requisitos -----------------------------------------------------------

    pub async fn list_requisitos(
        &self,
        filter: RequisitoFilter,
    ) -> Result<Vec<Requisito>, CatalogError> {
        let seen = self.requisitos.generation();
        if let Some(list) = lookup(&self.requisitos, "requisitos", &filter) {
            return Ok(list);
        }
        let list = match &self.backend {
            Backend::Memory(mem) => mem.list_requisitos(filter),
            Backend::Postgres(pool) => db::requisitos::list(pool, filter).await?,
        };
        self.requisitos.insert_if_current(filter, list.clone(), seen);
        Ok(list)
    }

    pub async fn get_requisito(&self, id: i64) -> Result<Option<Requisito>, CatalogError> {
        Ok(match &self.backend {
            Backend::Memory(mem) => mem.get_requisito(id),
            Backend::Postgres(pool) => db::requisitos::get(pool, id).await?,
        })
    }

    /// Append a requirement to an existing procedure.
    pub async fn create_requisito(&self, input: NewRequisito) -> Result<Requisito, CatalogError> {
        input.check()?;
        let input = input.normalized();
        let tramite_id = input.tramite_id;
        let requisito = match &self.backend {
            Backend::Memory(mem) => mem.create_requisito(&input)?,
            Backend::Postgres(pool) => db::requisitos::insert(pool, &input)
                .await
                .map_err(|e| {
                    classify(
                        e,
                        || "requisito already exists".to_string(),
                        || format!("tramite {tramite_id}"),
                    )
                })?,
        };
        self.invalidate_requisitos();
        self.invalidate_tramites();
        tracing::info!(
            requisito_id = requisito.id,
            tramite_id,
            sort_order = requisito.sort_order,
            "requisito created"
        );
        Ok(requisito)
    }

    pub async fn update_requisito(
        &self,
        id: i64,
        input: RequisitoUpdate,
    ) -> Result<Option<Requisito>, CatalogError> {
        input.check()?;
        let input = input.normalized();
        let updated = match &self.backend {
            Backend::Memory(mem) => mem.update_requisito(id, &input),
            Backend::Postgres(pool) => db::requisitos::update(pool, id, &input).await?,
        };
        if updated.is_some() {
            self.invalidate_requisitos();
            self.invalidate_tramites();
            tracing::info!(requisito_id = id, "requisito updated");
        }
        Ok(updated)
    }

    pub async fn delete_requisito(&self, id: i64) -> Result<bool, CatalogError> {
        let deleted = match &self.backend {
            Backend::Memory(mem) => mem.delete_requisito(id),
            Backend::Postgres(pool) => db::requisitos::delete(pool, id).await?,
        };
        if deleted {
            self.invalidate_requisitos();
            self.invalidate_tramites();
            tracing::info!(requisito_id = id, "requisito deleted");
        }
        Ok(deleted)
    }

    // -- Associations ---------------------------------------------------------

    /// Associations ordered by procedure then counter.
    pub async fn list_associations(
        &self,
        filter: AssociationFilter,
    ) -> Result<Vec<TramiteModulo>, CatalogError> {
        let seen = self.associations.generation();
        if let Some(list) = lookup(&self.associations, "associations", &filter) {
            return Ok(list);
        }
        let list = match &self.backend {
            Backend::Memory(mem) => mem.list_associations(filter),
            Backend::Postgres(pool) => db::tramite_modulo::list(pool, filter).await?,
        };
        self.associations.insert_if_current(filter, list.clone(), seen);
        Ok(list)
    }

    pub async fn get_association(
        &self,
        link: TramiteModulo,
    ) -> Result<Option<TramiteModulo>, CatalogError> {
        Ok(match &self.backend {
            Backend::Memory(mem) => mem.get_association(link),
            Backend::Postgres(pool) => db::tramite_modulo::get(pool, link).await?,
        })
    }

    /// Associate a procedure with a counter. Both must exist and the pair
    /// must be new.
    pub async fn create_association(
        &self,
        link: TramiteModulo,
    ) -> Result<TramiteModulo, CatalogError> {
        link.check()?;
        match &self.backend {
            Backend::Memory(mem) => {
                mem.create_association(link)?;
            }
            Backend::Postgres(pool) => {
                db::tramite_modulo::insert(pool, link).await.map_err(|e| {
                    classify(
                        e,
                        || {
                            format!(
                                "tramite {} is already attended at modulo {}",
                                link.tramite_id, link.modulo_id
                            )
                        },
                        || {
                            format!(
                                "tramite {} or modulo {}",
                                link.tramite_id, link.modulo_id
                            )
                        },
                    )
                })?;
            }
        }
        self.invalidate_associations();
        self.invalidate_tramites();
        tracing::info!(
            tramite_id = link.tramite_id,
            modulo_id = link.modulo_id,
            "association created"
        );
        Ok(link)
    }

    pub async fn delete_association(&self, link: TramiteModulo) -> Result<bool, CatalogError> {
        let deleted = match &self.backend {
            Backend::Memory(mem) => mem.delete_association(link),
            Backend::Postgres(pool) => db::tramite_modulo::delete(pool, link).await?,
        };
        if deleted {
            self.invalidate_associations();
            self.invalidate_tramites();
            tracing::info!(
                tramite_id = link.tramite_id,
                modulo_id = link.modulo_id,
                "association deleted"
            );
        }
        Ok(deleted)
    }
}
