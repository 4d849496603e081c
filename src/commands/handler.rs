//! Command Handler Module
//!
//! This module maps one command line onto one storage engine call and
//! turns the result into a [`Reply`].
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     CommandHandler                          │
//! │                                                             │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐     │
//! │  │ split_args()│───>│  dispatch() │───>│  cmd_xxx()  │     │
//! │  └─────────────┘    └─────────────┘    └─────────────┘     │
//! │                                               │             │
//! │                                               ▼             │
//! │                                      StorageEngine          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The handler keeps no state between calls. The keyword is matched
//! case-insensitively; every other argument is passed through as-is.
//! An unknown keyword or a wrong argument count is answered with an
//! error and never reaches the engine.

use crate::protocol::{split_args, Reply};
use crate::storage::{StorageEngine, StorageError};
use bytes::Bytes;
use std::num::IntErrorKind;
use std::sync::Arc;
use thiserror::Error;
use tracing::trace;

/// Errors produced while validating or executing a command.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The keyword is not a supported command
    #[error("Unknown command")]
    UnknownCommand,

    /// A known command with the wrong number of arguments
    #[error("Invalid {0} command")]
    WrongArity(&'static str),

    /// Failure detected by the storage engine
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<CommandError> for Reply {
    fn from(err: CommandError) -> Self {
        Reply::error(err.to_string())
    }
}

type CommandResult = Result<Reply, CommandError>;

/// A command implementation, called once arity has been checked.
type CommandFn = fn(&CommandHandler, &[Bytes]) -> CommandResult;

/// Argument count rule for a command, counted after the keyword.
#[derive(Debug, Clone, Copy)]
enum Arity {
    /// Exactly this many arguments
    Exact(usize),
    /// At least this many arguments
    AtLeast(usize),
    /// A key followed by at least one pair
    KeyAndPairs,
}

impl Arity {
    fn accepts(self, n: usize) -> bool {
        match self {
            Arity::Exact(expected) => n == expected,
            Arity::AtLeast(min) => n >= min,
            Arity::KeyAndPairs => n >= 3 && (n - 1) % 2 == 0,
        }
    }
}

/// Handles commands by dispatching them to the storage engine.
#[derive(Clone)]
pub struct CommandHandler {
    /// The storage engine
    storage: Arc<StorageEngine>,
}

impl CommandHandler {
    /// Creates a new command handler with the given storage engine.
    pub fn new(storage: Arc<StorageEngine>) -> Self {
        Self { storage }
    }

    /// Returns the storage engine this handler executes against.
    pub fn storage(&self) -> &Arc<StorageEngine> {
        &self.storage
    }

    /// Splits a raw, already trimmed line and executes it.
    pub fn execute_line(&self, line: &Bytes) -> Reply {
        self.execute(&split_args(line))
    }

    /// Executes a command and returns the reply.
    ///
    /// `args[0]` is the keyword, the rest are its arguments.
    pub fn execute(&self, args: &[Bytes]) -> Reply {
        let Some((name, rest)) = args.split_first() else {
            return CommandError::UnknownCommand.into();
        };

        let cmd = String::from_utf8_lossy(name).to_ascii_uppercase();
        trace!(command = %cmd, args = rest.len(), "Dispatching command");

        match self.dispatch(&cmd, rest) {
            Ok(reply) => reply,
            Err(e) => e.into(),
        }
    }

    /// Dispatches a command to its handler after checking its arity.
    fn dispatch(&self, cmd: &str, args: &[Bytes]) -> CommandResult {
        let (name, arity, run): (&'static str, Arity, CommandFn) = match cmd {
            // String commands
            "SET" => ("SET", Arity::Exact(2), Self::cmd_set),
            "GET" => ("GET", Arity::Exact(1), Self::cmd_get),
            "DEL" => ("DEL", Arity::Exact(1), Self::cmd_del),
            "INCR" => ("INCR", Arity::Exact(1), Self::cmd_incr),
            "DECR" => ("DECR", Arity::Exact(1), Self::cmd_decr),

            // List commands
            "LPUSH" => ("LPUSH", Arity::AtLeast(2), Self::cmd_lpush),
            "RPUSH" => ("RPUSH", Arity::AtLeast(2), Self::cmd_rpush),
            "LPOP" => ("LPOP", Arity::Exact(1), Self::cmd_lpop),
            "RPOP" => ("RPOP", Arity::Exact(1), Self::cmd_rpop),
            "LRANGE" => ("LRANGE", Arity::Exact(3), Self::cmd_lrange),
            "LLEN" => ("LLEN", Arity::Exact(1), Self::cmd_llen),

            // Hash commands
            "HSET" => ("HSET", Arity::Exact(3), Self::cmd_hset),
            "HGET" => ("HGET", Arity::Exact(2), Self::cmd_hget),
            "HMSET" => ("HMSET", Arity::KeyAndPairs, Self::cmd_hmset),
            "HMGET" => ("HMGET", Arity::AtLeast(2), Self::cmd_hmget),
            "HGETALL" => ("HGETALL", Arity::Exact(1), Self::cmd_hgetall),
            "HDEL" => ("HDEL", Arity::AtLeast(2), Self::cmd_hdel),

            // Set commands
            "SADD" => ("SADD", Arity::AtLeast(2), Self::cmd_sadd),
            "SMEMBERS" => ("SMEMBERS", Arity::Exact(1), Self::cmd_smembers),
            "SISMEMBER" => ("SISMEMBER", Arity::Exact(2), Self::cmd_sismember),
            "SREM" => ("SREM", Arity::AtLeast(2), Self::cmd_srem),

            // Sorted-set commands
            "ZADD" => ("ZADD", Arity::KeyAndPairs, Self::cmd_zadd),
            "ZRANGE" => ("ZRANGE", Arity::Exact(3), Self::cmd_zrange),
            "ZREM" => ("ZREM", Arity::AtLeast(2), Self::cmd_zrem),

            // Unknown command
            _ => return Err(CommandError::UnknownCommand),
        };

        if !arity.accepts(args.len()) {
            return Err(CommandError::WrongArity(name));
        }

        run(self, args)
    }

    // ========================================================================
    // Helper functions
    // ========================================================================

    /// Parses a range index. Never fails: out-of-range values saturate
    /// and anything that is not an integer reads as 0.
    fn get_index(value: &Bytes) -> i64 {
        let Ok(text) = std::str::from_utf8(value) else {
            return 0;
        };

        match text.parse::<i64>() {
            Ok(n) => n,
            Err(e) => match e.kind() {
                IntErrorKind::PosOverflow => i64::MAX,
                IntErrorKind::NegOverflow => i64::MIN,
                _ => 0,
            },
        }
    }

    /// Groups a flat argument tail into pairs.
    fn pairs(args: &[Bytes]) -> Vec<(Bytes, Bytes)> {
        args.chunks_exact(2)
            .map(|pair| (pair[0].clone(), pair[1].clone()))
            .collect()
    }

    // ========================================================================
    // String Commands
    // ========================================================================

    /// SET key value
    fn cmd_set(&self, args: &[Bytes]) -> CommandResult {
        self.storage.set(args[0].clone(), args[1].clone());
        Ok(Reply::Ok)
    }

    /// GET key
    fn cmd_get(&self, args: &[Bytes]) -> CommandResult {
        Ok(Reply::optional(self.storage.get(&args[0])))
    }

    /// DEL key
    fn cmd_del(&self, args: &[Bytes]) -> CommandResult {
        self.storage.delete(&args[0]);
        Ok(Reply::Ok)
    }

    /// INCR key
    fn cmd_incr(&self, args: &[Bytes]) -> CommandResult {
        let n = self.storage.incr(&args[0])?;
        Ok(Reply::integer(n))
    }

    /// DECR key
    fn cmd_decr(&self, args: &[Bytes]) -> CommandResult {
        let n = self.storage.decr(&args[0])?;
        Ok(Reply::integer(n))
    }

    // ========================================================================
    // List Commands
    // ========================================================================

    /// LPUSH key value [value ...]
    fn cmd_lpush(&self, args: &[Bytes]) -> CommandResult {
        let len = self.storage.lpush(args[0].clone(), args[1..].to_vec());
        Ok(Reply::integer(len as i64))
    }

    /// RPUSH key value [value ...]
    fn cmd_rpush(&self, args: &[Bytes]) -> CommandResult {
        let len = self.storage.rpush(args[0].clone(), args[1..].to_vec());
        Ok(Reply::integer(len as i64))
    }

    /// LPOP key
    fn cmd_lpop(&self, args: &[Bytes]) -> CommandResult {
        Ok(Reply::optional(self.storage.lpop(&args[0])))
    }

    /// RPOP key
    fn cmd_rpop(&self, args: &[Bytes]) -> CommandResult {
        Ok(Reply::optional(self.storage.rpop(&args[0])))
    }

    /// LRANGE key start stop
    fn cmd_lrange(&self, args: &[Bytes]) -> CommandResult {
        let start = Self::get_index(&args[1]);
        let stop = Self::get_index(&args[2]);

        Ok(Reply::Sequence(self.storage.lrange(&args[0], start, stop)))
    }

    /// LLEN key
    fn cmd_llen(&self, args: &[Bytes]) -> CommandResult {
        Ok(Reply::integer(self.storage.llen(&args[0]) as i64))
    }

    // ========================================================================
    // Hash Commands
    // ========================================================================

    /// HSET key field value
    fn cmd_hset(&self, args: &[Bytes]) -> CommandResult {
        self.storage
            .hset(args[0].clone(), args[1].clone(), args[2].clone());
        Ok(Reply::Ok)
    }

    /// HGET key field
    fn cmd_hget(&self, args: &[Bytes]) -> CommandResult {
        Ok(Reply::optional(self.storage.hget(&args[0], &args[1])))
    }

    /// HMSET key field value [field value ...]
    fn cmd_hmset(&self, args: &[Bytes]) -> CommandResult {
        self.storage.hmset(args[0].clone(), Self::pairs(&args[1..]));
        Ok(Reply::Ok)
    }

    /// HMGET key field [field ...]
    fn cmd_hmget(&self, args: &[Bytes]) -> CommandResult {
        Ok(Reply::Joined(self.storage.hmget(&args[0], &args[1..])))
    }

    /// HGETALL key
    fn cmd_hgetall(&self, args: &[Bytes]) -> CommandResult {
        let flat = self
            .storage
            .hgetall(&args[0])
            .into_iter()
            .flat_map(|(field, value)| [field, value])
            .collect();
        Ok(Reply::joined(flat))
    }

    /// HDEL key field [field ...]
    fn cmd_hdel(&self, args: &[Bytes]) -> CommandResult {
        let removed = self.storage.hdel(&args[0], &args[1..]);
        Ok(Reply::integer(removed as i64))
    }

    // ========================================================================
    // Set Commands
    // ========================================================================

    /// SADD key member [member ...]
    fn cmd_sadd(&self, args: &[Bytes]) -> CommandResult {
        let added = self.storage.sadd(args[0].clone(), args[1..].to_vec());
        Ok(Reply::integer(added as i64))
    }

    /// SMEMBERS key
    fn cmd_smembers(&self, args: &[Bytes]) -> CommandResult {
        Ok(Reply::joined(self.storage.smembers(&args[0])))
    }

    /// SISMEMBER key member
    fn cmd_sismember(&self, args: &[Bytes]) -> CommandResult {
        let is_member = self.storage.sismember(&args[0], &args[1]);
        Ok(Reply::integer(is_member as i64))
    }

    /// SREM key member [member ...]
    fn cmd_srem(&self, args: &[Bytes]) -> CommandResult {
        let removed = self.storage.srem(&args[0], &args[1..]);
        Ok(Reply::integer(removed as i64))
    }

    // ========================================================================
    // Sorted-Set Commands
    // ========================================================================

    /// ZADD key score member [score member ...]
    fn cmd_zadd(&self, args: &[Bytes]) -> CommandResult {
        self.storage.zadd(args[0].clone(), &Self::pairs(&args[1..]))?;
        Ok(Reply::Ok)
    }

    /// ZRANGE key start stop
    fn cmd_zrange(&self, args: &[Bytes]) -> CommandResult {
        let start = Self::get_index(&args[1]);
        let stop = Self::get_index(&args[2]);

        Ok(Reply::joined(self.storage.zrange(&args[0], start, stop)))
    }

    /// ZREM key member [member ...]
    fn cmd_zrem(&self, args: &[Bytes]) -> CommandResult {
        let removed = self.storage.zrem(&args[0], &args[1..]);
        Ok(Reply::integer(removed as i64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_handler() -> CommandHandler {
        let storage = Arc::new(StorageEngine::new());
        CommandHandler::new(storage)
    }

    /// Executes a line and returns the reply as it would appear on the wire.
    fn run(handler: &CommandHandler, line: &str) -> String {
        handler
            .execute_line(&Bytes::from(line.to_string()))
            .to_string()
    }

    fn sorted_tokens(reply: &str) -> Vec<String> {
        let mut tokens: Vec<String> = reply.split(' ').map(str::to_string).collect();
        tokens.sort();
        tokens
    }

    #[test]
    fn test_set_get() {
        let handler = create_handler();

        assert_eq!(run(&handler, "SET key value"), "OK");
        assert_eq!(run(&handler, "GET key"), "value");
    }

    #[test]
    fn test_get_nonexistent() {
        let handler = create_handler();
        assert_eq!(run(&handler, "GET nonexistent"), "(nil)");
    }

    #[test]
    fn test_keyword_is_case_insensitive() {
        let handler = create_handler();

        assert_eq!(run(&handler, "set Key Value"), "OK");
        assert_eq!(run(&handler, "gEt Key"), "Value");
        assert_eq!(run(&handler, "GET key"), "(nil)");
    }

    #[test]
    fn test_del_is_idempotent() {
        let handler = create_handler();

        assert_eq!(run(&handler, "DEL missing"), "OK");
        run(&handler, "SET k v");
        assert_eq!(run(&handler, "DEL k"), "OK");
        assert_eq!(run(&handler, "GET k"), "(nil)");
    }

    #[test]
    fn test_incr_decr() {
        let handler = create_handler();

        assert_eq!(run(&handler, "INCR counter"), "1");
        assert_eq!(run(&handler, "INCR counter"), "2");
        assert_eq!(run(&handler, "DECR counter"), "1");

        // Both initialize an absent key to 1
        assert_eq!(run(&handler, "DECR fresh"), "1");
    }

    #[test]
    fn test_incr_non_integer() {
        let handler = create_handler();

        run(&handler, "SET k abc");
        assert_eq!(run(&handler, "INCR k"), "ERROR: value is not an integer");
        assert_eq!(run(&handler, "GET k"), "abc");
    }

    #[test]
    fn test_list_commands() {
        let handler = create_handler();

        assert_eq!(run(&handler, "LPUSH k a b"), "2");
        assert_eq!(run(&handler, "LPUSH k c d"), "4");
        assert_eq!(run(&handler, "LRANGE k 0 10"), "[c d a b]");
        assert_eq!(run(&handler, "LLEN k"), "4");

        assert_eq!(run(&handler, "LPOP k"), "c");
        assert_eq!(run(&handler, "RPOP k"), "b");
        assert_eq!(run(&handler, "RPUSH k z"), "3");
        assert_eq!(run(&handler, "LRANGE k 1 1"), "[a]");
    }

    #[test]
    fn test_list_empty_replies() {
        let handler = create_handler();

        assert_eq!(run(&handler, "LLEN none"), "0");
        assert_eq!(run(&handler, "LPOP none"), "(nil)");
        assert_eq!(run(&handler, "RPOP none"), "(nil)");
        assert_eq!(run(&handler, "LRANGE none 0 10"), "[]");

        run(&handler, "RPUSH k a b");
        assert_eq!(run(&handler, "LRANGE k 2 1"), "[]");
        assert_eq!(run(&handler, "LRANGE k zero 0"), "[a]");
    }

    #[test]
    fn test_hash_commands() {
        let handler = create_handler();

        assert_eq!(run(&handler, "HSET user name Ariz"), "OK");
        assert_eq!(run(&handler, "HGET user name"), "Ariz");
        assert_eq!(run(&handler, "HGET user age"), "(nil)");

        assert_eq!(run(&handler, "HMSET user age 30 city Pune"), "OK");
        assert_eq!(run(&handler, "HMGET user city nope name"), "Pune (nil) Ariz");
        assert_eq!(run(&handler, "HMGET ghost a b"), "(nil) (nil)");

        let all = run(&handler, "HGETALL user");
        assert_eq!(
            sorted_tokens(&all),
            vec!["30", "Ariz", "Pune", "age", "city", "name"]
        );

        assert_eq!(run(&handler, "HDEL user name age nope"), "2");
    }

    #[test]
    fn test_hdel_last_field_removes_hash() {
        let handler = create_handler();

        run(&handler, "HSET k f 1");
        assert_eq!(run(&handler, "HDEL k f"), "1");
        assert_eq!(run(&handler, "HGET k f"), "(nil)");
        assert_eq!(run(&handler, "HGETALL k"), "");
        assert!(!handler.storage().hash_exists(&Bytes::from("k")));
    }

    #[test]
    fn test_set_commands() {
        let handler = create_handler();

        assert_eq!(run(&handler, "SADD k a a b"), "2");
        assert_eq!(run(&handler, "SADD k a"), "0");
        assert_eq!(run(&handler, "SISMEMBER k a"), "1");
        assert_eq!(run(&handler, "SISMEMBER k zz"), "0");
        assert_eq!(sorted_tokens(&run(&handler, "SMEMBERS k")), vec!["a", "b"]);

        assert_eq!(run(&handler, "SREM k a zz"), "1");
        assert_eq!(run(&handler, "SREM k b"), "1");
        assert_eq!(run(&handler, "SMEMBERS k"), "");
    }

    #[test]
    fn test_sorted_set_commands() {
        let handler = create_handler();

        assert_eq!(run(&handler, "ZADD k 3 x"), "OK");
        assert_eq!(run(&handler, "ZADD k 1 y"), "OK");
        assert_eq!(run(&handler, "ZADD k 2 z"), "OK");
        assert_eq!(run(&handler, "ZRANGE k 0 2"), "y z x");
        assert_eq!(run(&handler, "ZRANGE k 5 9"), "");

        assert_eq!(run(&handler, "ZREM k z nope"), "1");
        assert_eq!(run(&handler, "ZRANGE k 0 10"), "y x");
    }

    #[test]
    fn test_range_index_is_lenient() {
        let handler = create_handler();

        run(&handler, "RPUSH k a b");
        run(&handler, "ZADD z 1 a");

        // Non-integers read as 0
        assert_eq!(run(&handler, "LRANGE k x 0"), "[a]");
        assert_eq!(run(&handler, "ZRANGE z x 5"), "a");

        // Out-of-range values saturate
        assert_eq!(run(&handler, "LRANGE k 0 99999999999999999999"), "[a b]");
        assert_eq!(run(&handler, "LRANGE k -99999999999999999999 0"), "[a]");
        assert_eq!(run(&handler, "ZRANGE z 99999999999999999999 1"), "");
    }

    #[test]
    fn test_get_index() {
        assert_eq!(CommandHandler::get_index(&Bytes::from("42")), 42);
        assert_eq!(CommandHandler::get_index(&Bytes::from("-3")), -3);
        assert_eq!(CommandHandler::get_index(&Bytes::from("")), 0);
        assert_eq!(CommandHandler::get_index(&Bytes::from("1.5")), 0);
        assert_eq!(
            CommandHandler::get_index(&Bytes::from("99999999999999999999")),
            i64::MAX
        );
        assert_eq!(
            CommandHandler::get_index(&Bytes::from("-99999999999999999999")),
            i64::MIN
        );
    }

    #[test]
    fn test_zadd_invalid_score_is_partial() {
        let handler = create_handler();

        assert_eq!(run(&handler, "ZADD k 1 a bad b"), "ERROR: Invalid score");
        assert_eq!(run(&handler, "ZRANGE k 0 10"), "a");
    }

    #[test]
    fn test_zadd_score_out_of_range() {
        let handler = create_handler();

        assert_eq!(run(&handler, "ZADD z 1e400 b"), "ERROR: Invalid score");
        assert_eq!(run(&handler, "ZADD z inf b"), "OK");
        assert_eq!(run(&handler, "ZRANGE z 0 10"), "b");
    }

    #[test]
    fn test_empty_reads_on_fresh_keys() {
        let handler = create_handler();

        assert_eq!(run(&handler, "GET k"), "(nil)");
        assert_eq!(run(&handler, "LLEN k"), "0");
        assert_eq!(run(&handler, "SMEMBERS k"), "");
        assert_eq!(run(&handler, "HGETALL k"), "");
    }

    #[test]
    fn test_wrong_arity() {
        let handler = create_handler();

        assert_eq!(run(&handler, "SET k"), "ERROR: Invalid SET command");
        assert_eq!(run(&handler, "SET k v extra"), "ERROR: Invalid SET command");
        assert_eq!(run(&handler, "GET"), "ERROR: Invalid GET command");
        assert_eq!(run(&handler, "LPUSH k"), "ERROR: Invalid LPUSH command");
        assert_eq!(run(&handler, "LRANGE k 0"), "ERROR: Invalid LRANGE command");
        assert_eq!(run(&handler, "HMSET k f"), "ERROR: Invalid HMSET command");
        assert_eq!(run(&handler, "HMSET k f v g"), "ERROR: Invalid HMSET command");
        assert_eq!(run(&handler, "ZADD k 1"), "ERROR: Invalid ZADD command");
        assert_eq!(run(&handler, "SISMEMBER k"), "ERROR: Invalid SISMEMBER command");

        // Double space yields an empty token, so this is four arguments
        assert_eq!(run(&handler, "SET a  b"), "ERROR: Invalid SET command");
    }

    #[test]
    fn test_wrong_arity_does_not_touch_engine() {
        let handler = create_handler();

        run(&handler, "ZADD k 1");
        run(&handler, "LPUSH k");
        assert!(handler.storage().is_empty());
    }

    #[test]
    fn test_unknown_command() {
        let handler = create_handler();

        assert_eq!(run(&handler, "UNKNOWN"), "ERROR: Unknown command");
        assert_eq!(run(&handler, "PING"), "ERROR: Unknown command");
        assert_eq!(run(&handler, ""), "ERROR: Unknown command");
        assert_eq!(handler.execute(&[]), Reply::error("Unknown command"));
    }
}
