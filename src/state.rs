use crate::db::{DbPool, OrmConn};
use crate::payments::stripe::StripeClient;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub stripe: StripeClient,
}
