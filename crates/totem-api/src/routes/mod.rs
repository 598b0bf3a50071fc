//! # API Route Modules
//!
//! | Prefix | Module | Access |
//! |--------|--------|--------|
//! | `/api/tramites` | [`tramites`] | GET public, writes admin |
//! | `/api/modulos` | [`modulos`] | admin |
//! | `/api/requisitos` | [`requisitos`] | admin |
//! | `/api/tramite-modulo` | [`tramite_modulo`] | admin |
//! | `/api/upload` | [`upload`] | admin |
//! | `/api/login`, `/api/logout`, `/api/auth-check` | [`session`] | public |
//! | `/api/kiosk/*` | [`kiosk`] | public |
//! | `/`, `/login`, `/admin`, static files | [`pages`] | public |

pub mod kiosk;
pub mod modulos;
pub mod pages;
pub mod requisitos;
pub mod session;
pub mod tramite_modulo;
pub mod tramites;
pub mod upload;

/// `Cache-Control` on public catalog reads.
pub const PUBLIC_READ_CACHE: &str = "public, max-age=10, stale-while-revalidate=20";
