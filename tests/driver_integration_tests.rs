//! Integration Tests for the command driver
//!
//! Feeds JSON-lines sessions through `run_session` and checks every reply.

use mem_cache::driver::{run_session, SessionSummary};
use mem_cache::{CacheConfig, MemCache, PartialConfig};
use serde_json::{json, Value};

// == Helper Functions ==

fn run(cache: &mut MemCache, lines: &[Value]) -> (SessionSummary, Vec<Value>) {
    let input: String = lines.iter().map(|l| format!("{}\n", l)).collect();
    let mut output = Vec::new();
    let summary = run_session(cache, input.as_bytes(), &mut output).unwrap();
    let replies = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    (summary, replies)
}

fn quiet_cache(config: Value) -> MemCache {
    let config = serde_json::from_value::<PartialConfig>(config)
        .unwrap()
        .merge()
        .with_cache_log(false);
    MemCache::new(config)
}

// == Sessions ==

#[test]
fn test_full_session() {
    let mut cache = quiet_cache(json!({}));
    let key = json!({ "cacheKey": { "id": 1 } });

    let (summary, replies) = run(
        &mut cache,
        &[
            json!({ "op": "set", "type": "user", "options": key, "data": { "name": "A" } }),
            json!({ "op": "set", "type": "user", "options": key, "data": { "name": "X" } }),
            json!({ "op": "get", "type": "user", "options": key }),
            json!({ "op": "update", "type": "user", "options": key, "data": { "name": "B" } }),
            json!({ "op": "get", "type": "user", "options": key }),
            json!({ "op": "has", "type": "user", "options": key }),
            json!({ "op": "delete", "type": "user", "options": key }),
            json!({ "op": "get", "type": "user", "options": key }),
        ],
    );

    assert_eq!(summary, SessionSummary { commands: 8, failures: 0 });
    assert_eq!(replies[0], json!({ "ok": true, "result": true }));
    assert_eq!(replies[1], json!({ "ok": true, "result": false }));
    assert_eq!(replies[2], json!({ "ok": true, "hit": true, "result": { "name": "A" } }));
    assert_eq!(replies[3]["result"], true);
    assert_eq!(replies[4]["result"], json!({ "name": "B" }));
    assert_eq!(replies[5]["result"], true);
    assert_eq!(replies[6]["result"], true);
    assert_eq!(replies[7], json!({ "ok": true, "hit": false }));
}

#[test]
fn test_cached_null_is_a_hit() {
    let mut cache = quiet_cache(json!({}));
    let key = json!({ "cacheKey": "nothing" });

    let (_, replies) = run(
        &mut cache,
        &[
            json!({ "op": "set", "type": "user", "options": key, "data": null }),
            json!({ "op": "get", "type": "user", "options": key }),
        ],
    );

    assert_eq!(replies[1], json!({ "ok": true, "hit": true, "result": null }));
}

#[test]
fn test_session_reports_parameter_errors() {
    let mut cache = quiet_cache(json!({}));

    let (summary, replies) = run(
        &mut cache,
        &[
            json!({ "op": "delete" }),
            json!({ "op": "set", "type": "user", "data": 1 }),
            json!({ "op": "stats" }),
        ],
    );

    assert_eq!(summary, SessionSummary { commands: 3, failures: 2 });
    assert_eq!(replies[0]["code"], 4001);
    assert_eq!(replies[1]["code"], 5001);
    assert_eq!(replies[2]["ok"], true);
}

#[test]
fn test_session_respects_limit_and_relations() {
    let mut cache = quiet_cache(json!({
        "limit": 2,
        "relatedResourceMapper": { "user": "meta" }
    }));

    let (_, replies) = run(
        &mut cache,
        &[
            json!({ "op": "set", "type": "user", "options": { "cacheKey": "a" }, "data": 1 }),
            json!({ "op": "set", "type": "user", "options": { "cacheKey": "b" }, "data": 2 }),
            json!({ "op": "set", "type": "user", "options": { "cacheKey": "c" }, "data": 3 }),
            json!({ "op": "has", "type": "user", "options": { "cacheKey": "a" } }),
            json!({ "op": "set", "type": "meta", "options": { "cacheKey": "m" }, "data": 4 }),
            json!({ "op": "delete", "type": "user" }),
            json!({ "op": "has", "type": "meta", "options": { "cacheKey": "m" } }),
            json!({ "op": "stats" }),
        ],
    );

    assert_eq!(replies[3]["result"], false);
    assert_eq!(replies[5]["result"], true);
    assert_eq!(replies[6]["result"], false);
    assert_eq!(replies[7]["result"]["stats"]["evictions"], 1);
    assert_eq!(replies[7]["result"]["stats"]["totalEntries"], 0);
    assert!(cache.is_empty());
}

#[test]
fn test_parse_command() {
    let mut cache = quiet_cache(json!({}));

    let (_, replies) = run(
        &mut cache,
        &[json!({ "op": "parse", "identifier": "filter[account][op]=neq&tags[]=x" })],
    );

    assert_eq!(
        replies[0]["result"],
        json!({ "filter": { "account": { "op": "neq" } }, "tags": ["x"] })
    );
}

#[test]
fn test_config_defaults_when_nothing_given() {
    let cache = MemCache::new(CacheConfig::default());
    assert_eq!(cache.config(), &serde_json::from_value::<PartialConfig>(json!({})).unwrap().merge());
}
