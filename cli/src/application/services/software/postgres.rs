//! PostgreSQL administration through `psql` as the `postgres` superuser.

use hostkit_common::{ConfigEntry, DatabaseInfo, UserInfo};

use crate::application::ports::Executor;
use crate::application::session::{REDACTED, Session, classify};
use crate::domain::command::predicates;
use crate::domain::parsers::postgres as parse;
use crate::domain::{AdminError, CommandResult, shell_quote, validate_identifier};

const DATABASES_SQL: &str =
    "SELECT datname, pg_database_size(datname) FROM pg_database ORDER BY datname";

const ROLES_SQL: &str = "SELECT rolname, rolsuper, rolcanlogin, rolcreatedb FROM pg_roles \
     WHERE rolname !~ '^pg_' ORDER BY rolname";

const SETTINGS_SQL: &str = "SELECT name, setting FROM pg_settings ORDER BY name";

/// Directories that hold one installed server version each (Debian and
/// PGDG layouts).
const VERSIONS_COMMAND: &str = "ls -1d /usr/lib/postgresql/*/ /usr/pgsql-*/ 2>/dev/null";

/// Unaligned, tuples-only output separated by `|`. `cd /` keeps psql from
/// complaining about an unreadable working directory on stderr.
fn sql_command(sql: &str) -> String {
    format!(
        "cd / && sudo -u postgres psql -X -A -t -F '|' -c {}",
        shell_quote(sql)
    )
}

fn sql_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

pub struct PostgresService<'a, E: Executor> {
    session: &'a Session<E>,
}

impl<'a, E: Executor> PostgresService<'a, E> {
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
        if !result.is_success() && predicates::already_exists(&result) {
            return Err(AdminError::NonZeroExit {
                code: result.exit_code,
                output: "object already exists".to_string(),
            });
        }
        if !result.is_success() && predicates::psql_role_missing(&result) {
            return Err(AdminError::NonZeroExit {
                code: result.exit_code,
                output: "role does not exist".to_string(),
            });
        }
        classify(result, self.session.timeouts().command_secs)
    }

    /// Databases with their size; template databases are flagged.
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the `psql` call.
    pub async fn fetch_databases(&self) -> Result<Vec<DatabaseInfo>, AdminError> {
        let out = self.execute_sql(DATABASES_SQL).await?;
        Ok(parse::parse_databases(&out))
    }

    /// # Errors
    ///
    /// Returns `InvalidName` for unsafe names or the classified failure.
    pub async fn create_database(&self, name: &str) -> Result<(), AdminError> {
        validate_identifier(name)?;
        self.execute_sql(&format!("CREATE DATABASE \"{name}\""))
            .await
            .map(|_| ())
    }

    /// # Errors
    ///
    /// Returns `InvalidName` for unsafe names or the classified failure.
    pub async fn delete_database(&self, name: &str) -> Result<(), AdminError> {
        validate_identifier(name)?;
        self.execute_sql(&format!("DROP DATABASE \"{name}\""))
            .await
            .map(|_| ())
    }

    /// Roles other than the built-in `pg_*` ones.
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the `psql` call.
    pub async fn list_users(&self) -> Result<Vec<UserInfo>, AdminError> {
        let out = self.execute_sql(ROLES_SQL).await?;
        Ok(parse::parse_roles(&out))
    }

    /// Create a login role with a password.
    ///
    /// # Errors
    ///
    /// Returns `InvalidName` for unsafe names or the classified failure.
    pub async fn create_user(&self, name: &str, password: &str) -> Result<(), AdminError> {
        validate_identifier(name)?;
        let statement = |secret: &str| {
            format!(
                "CREATE ROLE \"{name}\" WITH LOGIN PASSWORD {}",
                sql_string(secret)
            )
        };
        self.execute_secret_sql(&statement(password), &statement(REDACTED))
            .await
            .map(|_| ())
    }

    /// # Errors
    ///
    /// Returns `InvalidName` for unsafe names or the classified failure.
    pub async fn drop_user(&self, name: &str) -> Result<(), AdminError> {
        validate_identifier(name)?;
        self.execute_sql(&format!("DROP ROLE \"{name}\""))
            .await
            .map(|_| ())
    }

    /// Runtime settings from `pg_settings`.
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the `psql` call.
    pub async fn fetch_settings(&self) -> Result<Vec<ConfigEntry>, AdminError> {
        let out = self.execute_sql(SETTINGS_SQL).await?;
        Ok(parse::parse_settings(&out))
    }

    /// Installed server major versions, oldest first. A layout without any
    /// version directory yields an empty list.
    pub async fn installed_versions(&self) -> Vec<String> {
        let result = self.session.run(VERSIONS_COMMAND).await;
        parse::parse_installed_versions(&result.output)
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

    #[tokio::test]
    async fn databases_with_sizes() {
        let s = session(ScriptedExecutor::new().on(
            "pg_database",
            "postgres|7631663\nshop|8818467\ntemplate0|7512568\n",
            0,
        ));
        let dbs = PostgresService::new(&s).fetch_databases().await.expect("dbs");
        assert_eq!(dbs.len(), 3);
        assert_eq!(dbs[1].size_bytes, Some(8_818_467));
        assert!(dbs[2].is_system);
    }

    #[tokio::test]
    async fn role_filter_survives_shell_quoting() {
        let s = session(ScriptedExecutor::new().on("pg_roles", "postgres|t|t|t\n", 0));
        let roles = PostgresService::new(&s).list_users().await.expect("roles");
        assert_eq!(roles[0].attributes, vec!["superuser", "login", "createdb"]);
        assert!(s.executor().calls()[0].contains(r"!~ '\''^pg_'\''"));
    }

    #[tokio::test]
    async fn drop_missing_role_is_named() {
        let s = session(ScriptedExecutor::new().on(
            "DROP ROLE",
            "ERROR:  role \"ghost\" does not exist",
            1,
        ));
        let err = PostgresService::new(&s).drop_user("ghost").await.expect_err("missing");
        assert!(err.to_string().contains("role does not exist"));
    }

    #[tokio::test]
    async fn versions_from_directory_listing() {
        let s = session(ScriptedExecutor::new().on(
            "/usr/lib/postgresql",
            "/usr/lib/postgresql/16/\n/usr/lib/postgresql/14/\n",
            2,
        ));
        let versions = PostgresService::new(&s).installed_versions().await;
        assert_eq!(versions, vec!["14", "16"]);
    }

    #[tokio::test]
    async fn create_user_keeps_password_out_of_the_log() {
        let logs = LogCapture::default();
        let _guard = logs.install();
        let s = session(ScriptedExecutor::new().on("CREATE ROLE", "CREATE ROLE\n", 0));
        PostgresService::new(&s)
            .create_user("app", "S3cretPw!")
            .await
            .expect("create");

        assert!(s.executor().calls()[0].contains("S3cretPw!"));
        let captured = logs.contents();
        assert!(captured.contains("CREATE ROLE"), "{captured}");
        assert!(!captured.contains("S3cretPw!"), "{captured}");
    }
}
