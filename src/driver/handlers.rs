//! Command Handlers
//!
//! Maps each driver command onto a cache operation.

use serde_json::json;

use crate::cache::MemCache;
use crate::error::Result;
use crate::models::{Command, Reply};

/// Runs one command against the cache.
///
/// Parameter errors become failed replies; they never abort the session.
pub fn execute(cache: &mut MemCache, command: Command) -> Reply {
    match dispatch(cache, command) {
        Ok(reply) => reply,
        Err(err) => Reply::failure(&err),
    }
}

fn dispatch(cache: &mut MemCache, command: Command) -> Result<Reply> {
    let reply = match command {
        Command::Has {
            resource_type,
            options,
        } => Reply::success(cache.has(&resource_type, &options)),
        Command::Get {
            resource_type,
            options,
        } => Reply::lookup(cache.get(&resource_type, &options)?),
        Command::Set {
            resource_type,
            options,
            data,
        } => Reply::success(cache.set(&resource_type, &options, &data)?),
        Command::Update {
            resource_type,
            options,
            data,
        } => Reply::success(cache.update(&resource_type, &options, &data)?),
        Command::Delete {
            resource_type,
            options,
        } => Reply::success(cache.delete(&resource_type, &options)?),
        Command::Clear => {
            cache.clear();
            Reply::done()
        }
        Command::Stats => {
            let stats = cache.stats();
            Reply::success(json!({
                "stats": stats,
                "hitRate": stats.hit_rate(),
            }))
        }
        Command::Parse { identifier } => Reply::success(MemCache::parse_identifier(&identifier)),
    };
    Ok(reply)
}
