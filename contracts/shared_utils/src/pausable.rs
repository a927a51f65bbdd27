//! Instance-storage pause flag.
//!
//! Authorization is the caller's concern; these helpers only read and write
//! the flag.

use soroban_sdk::{symbol_short, Env, Symbol};

pub struct Pausable;

impl Pausable {
    pub const PAUSED_KEY: Symbol = symbol_short!("paused");

    pub fn is_paused(e: &Env) -> bool {
        e.storage()
            .instance()
            .get::<_, bool>(&Self::PAUSED_KEY)
            .unwrap_or(false)
    }

    pub fn pause(e: &Env) {
        e.storage().instance().set(&Self::PAUSED_KEY, &true);
    }

    pub fn unpause(e: &Env) {
        e.storage().instance().set(&Self::PAUSED_KEY, &false);
    }
}
