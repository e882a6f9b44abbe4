//! Client-side data layer: the global store the storefront UI reads and
//! mutates, plus the HTTP client it syncs through. The store owns the
//! catalog, the cart mapping, the session user, and the search query; every
//! cart mutation schedules a best-effort push of the whole mapping to the
//! backend.

pub mod http;
pub mod store;
