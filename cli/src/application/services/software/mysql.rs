//! MySQL / MariaDB administration through the `mysql` client.
//!
//! Statements run as the local root account over the unix socket
//! (`sudo mysql`), which both MySQL and MariaDB packages configure by
//! default.

use hostkit_common::{ConfigEntry, DatabaseInfo, UserInfo};

use crate::application::ports::Executor;
use crate::application::session::{REDACTED, Session, classify};
use crate::domain::command::predicates;
use crate::domain::parsers::mysql as parse;
use crate::domain::{AdminError, CommandResult, shell_quote, validate_identifier};

const DATABASES_SQL: &str = "SELECT s.schema_name, COALESCE(SUM(t.data_length + t.index_length), 0) \
     FROM information_schema.schemata s \
     LEFT JOIN information_schema.tables t ON t.table_schema = s.schema_name \
     GROUP BY s.schema_name ORDER BY s.schema_name";

const USERS_SQL: &str = "SELECT User, Host FROM mysql.user ORDER BY User, Host";

const VARIABLES_SQL: &str = "SHOW GLOBAL VARIABLES";

/// Client invocation for one statement: no headers, tab-separated batch
/// output.
fn sql_command(sql: &str) -> String {
    format!("sudo mysql -N -B -e {}", shell_quote(sql))
}

/// MySQL string literal. Backslashes are escapes in the default SQL mode.
fn sql_string(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
}

/// Account host part: a name, address or `%` wildcard pattern.
fn validate_account_host(host: &str) -> Result<(), AdminError> {
    let valid = !host.is_empty()
        && host.len() <= 255
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '%' | ':'));
    if valid {
        Ok(())
    } else {
        Err(AdminError::InvalidName(host.to_string()))
    }
}

pub struct MysqlService<'a, E: Executor> {
    session: &'a Session<E>,
}

impl<'a, E: Executor> MysqlService<'a, E> {
    pub fn new(session: &'a Session<E>) -> Self {
        Self { session }
    }

    async fn execute_sql(&self, sql: &str) -> Result<String, AdminError> {
        let result = self.session.run(&sql_command(sql)).await;
        self.interpret(result)
    }

    /// Statement carrying a password; only `shown` is logged.
    async fn execute_secret_sql(&self, sql: &str, shown: &str) -> Result<String, AdminError> {
        let result = self
            .session
            .run_redacted(&sql_command(sql), &sql_command(shown))
            .await;
        self.interpret(result)
    }

    fn interpret(&self, result: CommandResult) -> Result<String, AdminError> {
        if !result.is_success() && predicates::mysql_access_denied(&result) {
            return Err(AdminError::NonZeroExit {
                code: result.exit_code,
                output: "MySQL denied access to the local root account".to_string(),
            });
        }
        if !result.is_success() && predicates::already_exists(&result) {
            return Err(AdminError::NonZeroExit {
                code: result.exit_code,
                output: "object already exists".to_string(),
            });
        }
        classify(result, self.session.timeouts().command_secs)
    }

    /// All schemas with their on-disk size; server schemas are flagged.
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the client call.
    pub async fn fetch_databases(&self) -> Result<Vec<DatabaseInfo>, AdminError> {
        let out = self.execute_sql(DATABASES_SQL).await?;
        Ok(parse::parse_databases(&out))
    }

    /// # Errors
    ///
    /// Returns `InvalidName` for unsafe names or the classified failure.
    pub async fn create_database(&self, name: &str) -> Result<(), AdminError> {
        validate_identifier(name)?;
        self.execute_sql(&format!("CREATE DATABASE `{name}`"))
            .await
            .map(|_| ())
    }

    /// # Errors
    ///
    /// Returns `InvalidName` for unsafe names or the classified failure.
    pub async fn delete_database(&self, name: &str) -> Result<(), AdminError> {
        validate_identifier(name)?;
        self.execute_sql(&format!("DROP DATABASE `{name}`"))
            .await
            .map(|_| ())
    }

    /// Accounts as `User\tHost` rows.
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the client call.
    pub async fn list_users(&self) -> Result<Vec<UserInfo>, AdminError> {
        let out = self.execute_sql(USERS_SQL).await?;
        Ok(parse::parse_users(&out))
    }

    /// # Errors
    ///
    /// Returns `InvalidName` for unsafe names or hosts, or the classified
    /// failure.
    pub async fn create_user(&self, name: &str, host: &str, password: &str) -> Result<(), AdminError> {
        validate_identifier(name)?;
        validate_account_host(host)?;
        let statement = |secret: &str| {
            format!(
                "CREATE USER {}@{} IDENTIFIED BY {}",
                sql_string(name),
                sql_string(host),
                sql_string(secret)
            )
        };
        self.execute_secret_sql(&statement(password), &statement(REDACTED))
            .await
            .map(|_| ())
    }

    /// # Errors
    ///
    /// Returns `InvalidName` for unsafe names or hosts, or the classified
    /// failure.
    pub async fn drop_user(&self, name: &str, host: &str) -> Result<(), AdminError> {
        validate_identifier(name)?;
        validate_account_host(host)?;
        let sql = format!("DROP USER {}@{}", sql_string(name), sql_string(host));
        self.execute_sql(&sql).await.map(|_| ())
    }

    /// Server variables from `SHOW GLOBAL VARIABLES`.
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the client call.
    pub async fn fetch_variables(&self) -> Result<Vec<ConfigEntry>, AdminError> {
        let out = self.execute_sql(VARIABLES_SQL).await?;
        Ok(parse::parse_variables(&out))
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
    fn string_literal_escaping() {
        assert_eq!(sql_string("it's"), "'it''s'");
        assert_eq!(sql_string(r"a\b"), r"'a\\b'");
    }

    #[test]
    fn account_hosts() {
        assert!(validate_account_host("%").is_ok());
        assert!(validate_account_host("10.0.0.%").is_ok());
        assert!(validate_account_host("localhost").is_ok());
        assert!(validate_account_host("a' OR '1").is_err());
    }

    #[tokio::test]
    async fn users_parsed_from_tab_rows() {
        let s = session(
            ScriptedExecutor::new().on("mysql.user", "root\tlocalhost\napp\t%\n", 0),
        );
        let users = MysqlService::new(&s).list_users().await.expect("users");
        assert_eq!(users.len(), 2);
        assert_eq!(users[1].name, "app");
        assert_eq!(users[1].host.as_deref(), Some("%"));
    }

    #[tokio::test]
    async fn create_database_quotes_identifier() {
        let s = session(ScriptedExecutor::new().on("CREATE DATABASE", "", 0));
        MysqlService::new(&s).create_database("shop").await.expect("create");
        assert_eq!(
            s.executor().calls(),
            vec!["sudo mysql -N -B -e 'CREATE DATABASE `shop`'"]
        );
    }

    #[tokio::test]
    async fn create_database_rejects_injection_without_remote_call() {
        let s = session(ScriptedExecutor::new());
        let err = MysqlService::new(&s)
            .create_database("x`; DROP DATABASE mysql; --")
            .await
            .expect_err("rejected");
        assert!(matches!(err, AdminError::InvalidName(_)));
        assert!(s.executor().calls().is_empty());
    }

    #[tokio::test]
    async fn access_denied_is_named() {
        let s = session(ScriptedExecutor::new().on(
            "mysql",
            "ERROR 1045 (28000): Access denied for user 'root'@'localhost'",
            1,
        ));
        let err = MysqlService::new(&s).fetch_databases().await.expect_err("denied");
        assert!(err.to_string().contains("denied access"));
    }

    #[tokio::test]
    async fn create_user_escapes_password() {
        let s = session(ScriptedExecutor::new().on("CREATE USER", "", 0));
        MysqlService::new(&s)
            .create_user("app", "%", "pa'ss")
            .await
            .expect("create");
        let call = &s.executor().calls()[0];
        assert!(call.contains("IDENTIFIED BY"));
        // SQL doubles the quote, then the shell quoting wraps it.
        assert!(call.contains(r"pa'\'''\''ss"));
    }

    #[tokio::test]
    async fn create_user_keeps_password_out_of_the_log() {
        let logs = LogCapture::default();
        let _guard = logs.install();
        let s = session(ScriptedExecutor::new().on("CREATE USER", "", 0));
        MysqlService::new(&s)
            .create_user("app", "localhost", "S3cretPw!")
            .await
            .expect("create");

        assert!(s.executor().calls()[0].contains("S3cretPw!"));
        let captured = logs.contents();
        assert!(captured.contains("CREATE USER"), "{captured}");
        assert!(captured.contains(REDACTED));
        assert!(!captured.contains("S3cretPw!"), "{captured}");
    }
}
