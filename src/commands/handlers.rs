//! Store command handlers.
//!
//! Each handler takes the already-tokenized argument list (command name
//! stripped) and returns the exact string to write back to the client, or a
//! [`CommandError`] the front-end renders as `ERR <message>`.

use super::registry::CommandError;
use crate::store::Store;

fn parse_i64_or_zero(s: &str) -> i64 {
    s.parse().unwrap_or(0)
}

pub fn set(store: &Store, args: &[String]) -> Result<String, CommandError> {
    if args.len() < 2 {
        return Err(CommandError::Arity("SET"));
    }
    store.set(&args[0], &args[1]);
    Ok("OK".to_string())
}

pub fn get(store: &Store, args: &[String]) -> Result<String, CommandError> {
    if args.is_empty() {
        return Err(CommandError::Arity("GET"));
    }
    Ok(store.get(&args[0]).unwrap_or_default())
}

pub fn del(store: &Store, args: &[String]) -> Result<String, CommandError> {
    if args.is_empty() {
        return Err(CommandError::Arity("DEL"));
    }
    Ok(if store.del(&args[0]) { "1" } else { "0" }.to_string())
}

pub fn exists(store: &Store, args: &[String]) -> Result<String, CommandError> {
    if args.is_empty() {
        return Err(CommandError::Arity("EXISTS"));
    }
    Ok(if store.exists(&args[0]) { "1" } else { "0" }.to_string())
}

pub fn lpush(store: &Store, args: &[String]) -> Result<String, CommandError> {
    if args.len() < 2 {
        return Err(CommandError::Arity("LPUSH"));
    }
    let len = store.lpush(&args[0], &args[1..]);
    Ok(len.to_string())
}

pub fn rpush(store: &Store, args: &[String]) -> Result<String, CommandError> {
    if args.len() < 2 {
        return Err(CommandError::Arity("RPUSH"));
    }
    let len = store.rpush(&args[0], &args[1..]);
    Ok(len.to_string())
}

pub fn lpop(store: &Store, args: &[String]) -> Result<String, CommandError> {
    if args.is_empty() {
        return Err(CommandError::Arity("LPOP"));
    }
    Ok(store.lpop(&args[0]).unwrap_or_default())
}

pub fn rpop(store: &Store, args: &[String]) -> Result<String, CommandError> {
    if args.is_empty() {
        return Err(CommandError::Arity("RPOP"));
    }
    Ok(store.rpop(&args[0]).unwrap_or_default())
}

pub fn lrange(store: &Store, args: &[String]) -> Result<String, CommandError> {
    if args.len() < 3 {
        return Err(CommandError::Arity("LRANGE"));
    }
    let start = parse_i64_or_zero(&args[1]);
    let end = parse_i64_or_zero(&args[2]);
    Ok(store.lrange(&args[0], start, end).join(","))
}

pub fn sadd(store: &Store, args: &[String]) -> Result<String, CommandError> {
    if args.len() < 2 {
        return Err(CommandError::Arity("SADD"));
    }
    let added = store.sadd(&args[0], &args[1..]);
    Ok(added.to_string())
}

pub fn srem(store: &Store, args: &[String]) -> Result<String, CommandError> {
    if args.len() < 2 {
        return Err(CommandError::Arity("SREM"));
    }
    let removed = store.srem(&args[0], &args[1..]);
    Ok(removed.to_string())
}

pub fn smembers(store: &Store, args: &[String]) -> Result<String, CommandError> {
    if args.is_empty() {
        return Err(CommandError::Arity("SMEMBERS"));
    }
    Ok(store.smembers(&args[0]).join(","))
}

pub fn keys(store: &Store, _args: &[String]) -> Result<String, CommandError> {
    Ok(store.keys().join(","))
}

pub fn flushdb(store: &Store, _args: &[String]) -> Result<String, CommandError> {
    store.flushdb();
    Ok("OK".to_string())
}

pub fn info(store: &Store, _args: &[String]) -> Result<String, CommandError> {
    Ok(format!("keys:{}", store.len()))
}

pub fn expire(store: &Store, args: &[String]) -> Result<String, CommandError> {
    if args.len() < 2 {
        return Err(CommandError::Arity("EXPIRE"));
    }
    let seconds = parse_i64_or_zero(&args[1]);
    Ok(if store.expire(&args[0], seconds) { "1" } else { "0" }.to_string())
}

pub fn ttl(store: &Store, args: &[String]) -> Result<String, CommandError> {
    if args.is_empty() {
        return Err(CommandError::Arity("TTL"));
    }
    Ok(store.ttl(&args[0]).to_string())
}

pub fn snapshot(store: &Store, args: &[String]) -> Result<String, CommandError> {
    let path = args.first().map(String::as_str).unwrap_or(crate::snapshot::DEFAULT_SNAPSHOT_PATH);
    match crate::snapshot::save(store, path) {
        Ok(()) => Ok("OK".to_string()),
        Err(e) => Err(CommandError::other(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_set_get_del_exists() {
        let store = Store::new();
        assert_eq!(set(&store, &args(&["foo", "bar"])).unwrap(), "OK");
        assert_eq!(get(&store, &args(&["foo"])).unwrap(), "bar");
        assert_eq!(exists(&store, &args(&["foo"])).unwrap(), "1");
        assert_eq!(del(&store, &args(&["foo"])).unwrap(), "1");
        assert_eq!(exists(&store, &args(&["foo"])).unwrap(), "0");
    }

    #[test]
    fn test_set_arity_error() {
        let store = Store::new();
        let err = set(&store, &args(&["onlykey"])).unwrap_err();
        assert_eq!(err, CommandError::Arity("SET"));
    }

    #[test]
    fn test_get_missing_is_empty_not_error() {
        let store = Store::new();
        assert_eq!(get(&store, &args(&["nope"])).unwrap(), "");
    }

    #[test]
    fn test_list_commands() {
        let store = Store::new();
        assert_eq!(lpush(&store, &args(&["l", "a", "b"])).unwrap(), "2");
        assert_eq!(rpush(&store, &args(&["l", "c"])).unwrap(), "3");
        assert_eq!(lrange(&store, &args(&["l", "0", "1"])).unwrap(), "b,a");
        assert_eq!(lpop(&store, &args(&["l"])).unwrap(), "b");
        assert_eq!(rpop(&store, &args(&["l"])).unwrap(), "c");
    }

    #[test]
    fn test_set_commands_sorted_output() {
        let store = Store::new();
        assert_eq!(sadd(&store, &args(&["s", "b", "a", "c"])).unwrap(), "3");
        assert_eq!(smembers(&store, &args(&["s"])).unwrap(), "a,b,c");
        assert_eq!(srem(&store, &args(&["s", "b"])).unwrap(), "1");
        assert_eq!(smembers(&store, &args(&["s"])).unwrap(), "a,c");
    }

    #[test]
    fn test_keys_and_flushdb() {
        let store = Store::new();
        set(&store, &args(&["b", "1"])).unwrap();
        set(&store, &args(&["a", "1"])).unwrap();
        assert_eq!(keys(&store, &[]).unwrap(), "a,b");
        assert_eq!(flushdb(&store, &[]).unwrap(), "OK");
        assert_eq!(keys(&store, &[]).unwrap(), "");
    }

    #[test]
    fn test_info() {
        let store = Store::new();
        set(&store, &args(&["a", "1"])).unwrap();
        assert_eq!(info(&store, &[]).unwrap(), "keys:1");
    }

    #[test]
    fn test_expire_and_ttl() {
        let store = Store::new();
        set(&store, &args(&["k", "v"])).unwrap();
        assert_eq!(expire(&store, &args(&["k", "100"])).unwrap(), "1");
        let t: i64 = ttl(&store, &args(&["k"])).unwrap().parse().unwrap();
        assert!(t > 0 && t <= 100);
        assert_eq!(expire(&store, &args(&["missing", "10"])).unwrap(), "0");
        assert_eq!(ttl(&store, &args(&["missing"])).unwrap(), "-2");
    }

    #[test]
    fn test_expire_bad_integer_defaults_to_zero() {
        let store = Store::new();
        set(&store, &args(&["k", "v"])).unwrap();
        assert_eq!(expire(&store, &args(&["k", "notanumber"])).unwrap(), "1");
        assert_eq!(get(&store, &args(&["k"])).unwrap(), "");
    }
}
