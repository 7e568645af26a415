//! Redis / Valkey administration through `redis-cli --raw`.
//!
//! `redis-cli` exits 0 even when the server answers with an error, so every
//! reply is checked with the Redis predicates before it is parsed.

use hostkit_common::{ConfigEntry, DatabaseInfo, Metric, UserInfo};

use crate::application::ports::Executor;
use crate::application::session::{REDACTED, Session, classify};
use crate::domain::command::predicates;
use crate::domain::parsers::redis as parse;
use crate::domain::{AdminError, CommandResult, shell_quote, validate_identifier};

fn cli_command(args: &[&str]) -> String {
    let quoted: Vec<String> = args.iter().map(|a| shell_quote(a)).collect();
    format!("redis-cli --raw {}", quoted.join(" "))
}

/// Settings whose value is a password.
fn is_secret_setting(key: &str) -> bool {
    ["requirepass", "masterauth"]
        .iter()
        .any(|secret| key.eq_ignore_ascii_case(secret))
}

fn reply_error(result: &CommandResult) -> AdminError {
    AdminError::NonZeroExit {
        code: if result.exit_code == 0 { 1 } else { result.exit_code },
        output: result.clean_output(),
    }
}

pub struct RedisService<'a, E: Executor> {
    session: &'a Session<E>,
}

impl<'a, E: Executor> RedisService<'a, E> {
    pub fn new(session: &'a Session<E>) -> Self {
        Self { session }
    }

    async fn call(&self, args: &[&str]) -> Result<String, AdminError> {
        let result = self.session.run(&cli_command(args)).await;
        if result.is_success() && predicates::redis_reply_error(&result) {
            return Err(reply_error(&result));
        }
        classify(result, self.session.timeouts().command_secs)
    }

    /// Commands whose only acceptable reply is `OK`.
    async fn call_expect_ok(&self, args: &[&str]) -> Result<(), AdminError> {
        let result = self.session.run(&cli_command(args)).await;
        self.expect_ok(result)
    }

    fn expect_ok(&self, result: CommandResult) -> Result<(), AdminError> {
        if predicates::redis_reply_ok(&result) {
            return Ok(());
        }
        if result.is_success() {
            return Err(reply_error(&result));
        }
        classify(result, self.session.timeouts().command_secs).map(|_| ())
    }

    /// Non-empty logical databases from `INFO keyspace`.
    ///
    /// # Errors
    ///
    /// Returns the classified failure or the server's error reply.
    pub async fn fetch_databases(&self) -> Result<Vec<DatabaseInfo>, AdminError> {
        let out = self.call(&["INFO", "keyspace"]).await?;
        Ok(parse::parse_keyspace(&out))
    }

    /// Delete every key of logical database `index`.
    ///
    /// # Errors
    ///
    /// Returns the classified failure or the server's error reply.
    pub async fn flush_database(&self, index: u32) -> Result<(), AdminError> {
        let index = index.to_string();
        self.call_expect_ok(&["-n", &index, "FLUSHDB"]).await
    }

    /// `CONFIG GET <pattern>` as key/value entries.
    ///
    /// # Errors
    ///
    /// Returns the classified failure or the server's error reply.
    pub async fn config_get(&self, pattern: &str) -> Result<Vec<ConfigEntry>, AdminError> {
        let out = self.call(&["CONFIG", "GET", pattern]).await?;
        Ok(parse::parse_config_get(&out))
    }

    /// # Errors
    ///
    /// Fails unless the server replies `OK`.
    pub async fn config_set(&self, key: &str, value: &str) -> Result<(), AdminError> {
        if !is_secret_setting(key) {
            return self.call_expect_ok(&["CONFIG", "SET", key, value]).await;
        }
        let result = self
            .session
            .run_redacted(
                &cli_command(&["CONFIG", "SET", key, value]),
                &cli_command(&["CONFIG", "SET", key, REDACTED]),
            )
            .await;
        self.expect_ok(result)
    }

    /// # Errors
    ///
    /// Returns the classified failure or the server's error reply.
    pub async fn list_users(&self) -> Result<Vec<UserInfo>, AdminError> {
        let out = self.call(&["ACL", "LIST"]).await?;
        Ok(parse::parse_acl_list(&out))
    }

    /// Create (or update) an enabled user with full access.
    ///
    /// # Errors
    ///
    /// Returns `InvalidName` for unsafe names; fails unless the server
    /// replies `OK`.
    pub async fn create_user(&self, name: &str, password: &str) -> Result<(), AdminError> {
        validate_identifier(name)?;
        let command = |secret: &str| {
            let secret = format!(">{secret}");
            cli_command(&["ACL", "SETUSER", name, "on", &secret, "~*", "&*", "+@all"])
        };
        let result = self
            .session
            .run_redacted(&command(password), &command(REDACTED))
            .await;
        self.expect_ok(result)
    }

    /// # Errors
    ///
    /// Returns `InvalidName` for unsafe names, the server's error reply, or
    /// `NonZeroExit` when no such user existed.
    pub async fn delete_user(&self, name: &str) -> Result<(), AdminError> {
        validate_identifier(name)?;
        let out = self.call(&["ACL", "DELUSER", name]).await?;
        match out.trim() {
            "1" => Ok(()),
            _ => Err(AdminError::NonZeroExit {
                code: 1,
                output: format!("no ACL user named '{name}'"),
            }),
        }
    }

    /// Every `INFO` field as a metric.
    ///
    /// # Errors
    ///
    /// Returns the classified failure or the server's error reply.
    pub async fn server_info(&self) -> Result<Vec<Metric>, AdminError> {
        let out = self.call(&["INFO"]).await?;
        Ok(parse::parse_info(&out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{LogCapture, ScriptedExecutor};
    use crate::domain::TimeoutConfig;

    fn session(exec: ScriptedExecutor) -> Session<ScriptedExecutor> {
        Session::new(exec, TimeoutConfig::default())
    }

    #[test]
    fn arguments_are_quoted() {
        assert_eq!(
            cli_command(&["CONFIG", "GET", "max*"]),
            "redis-cli --raw 'CONFIG' 'GET' 'max*'"
        );
    }

    #[tokio::test]
    async fn config_set_requires_ok() {
        let s = session(ScriptedExecutor::new().on("CONFIG' 'SET", "OK\n", 0));
        RedisService::new(&s)
            .config_set("maxmemory", "100mb")
            .await
            .expect("set");

        let s = session(ScriptedExecutor::new().on(
            "CONFIG' 'SET",
            "ERR Unknown option or number of arguments for CONFIG SET - 'bogus'\n",
            0,
        ));
        let err = RedisService::new(&s)
            .config_set("bogus", "1")
            .await
            .expect_err("error reply");
        assert!(matches!(err, AdminError::NonZeroExit { code: 1, .. }));
    }

    #[tokio::test]
    async fn error_reply_with_zero_exit_is_failure() {
        let s = session(ScriptedExecutor::new().on("INFO", "NOAUTH Authentication required.\n", 0));
        assert!(RedisService::new(&s).fetch_databases().await.is_err());
    }

    #[tokio::test]
    async fn unreachable_server_is_not_a_reply() {
        let s = session(ScriptedExecutor::new().on(
            "INFO",
            "Could not connect to Redis at 127.0.0.1:6379: Connection refused\n",
            1,
        ));
        let err = RedisService::new(&s).server_info().await.expect_err("down");
        assert!(err.to_string().contains("Connection refused"));
    }

    #[tokio::test]
    async fn delete_user_checks_count() {
        let s = session(ScriptedExecutor::new().on("DELUSER", "0\n", 0));
        assert!(RedisService::new(&s).delete_user("ghost").await.is_err());
        let s = session(ScriptedExecutor::new().on("DELUSER", "1\n", 0));
        assert!(RedisService::new(&s).delete_user("app").await.is_ok());
    }

    #[tokio::test]
    async fn create_user_keeps_password_out_of_the_log() {
        let logs = LogCapture::default();
        let _guard = logs.install();
        let s = session(ScriptedExecutor::new().on("SETUSER", "OK\n", 0));
        RedisService::new(&s)
            .create_user("app", "S3cretPw!")
            .await
            .expect("create");

        assert!(s.executor().calls()[0].contains(">S3cretPw!"));
        let captured = logs.contents();
        assert!(captured.contains("SETUSER"), "{captured}");
        assert!(!captured.contains("S3cretPw!"), "{captured}");
    }

    #[tokio::test]
    async fn requirepass_value_is_masked_in_the_log() {
        let logs = LogCapture::default();
        let _guard = logs.install();
        let s = session(ScriptedExecutor::new().on("CONFIG", "OK\n", 0));
        let redis = RedisService::new(&s);
        redis.config_set("requirepass", "S3cretPw!").await.expect("set");
        redis.config_set("maxmemory", "64mb").await.expect("set");

        assert!(s.executor().calls()[0].contains("S3cretPw!"));
        let captured = logs.contents();
        assert!(!captured.contains("S3cretPw!"), "{captured}");
        assert!(captured.contains("64mb"), "{captured}");
    }
}
