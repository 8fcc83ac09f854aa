//! Integration tests for process execution

#[cfg(test)]
mod tests {
    use depbuild_platform::*;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_runs_in_working_directory_with_replaced_env() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), b"here").unwrap();

        let mut env = BTreeMap::new();
        env.insert("PATH".to_string(), std::env::var("PATH").unwrap_or_default());
        env.insert("DEPBUILD_MARKER".to_string(), "marker-value".to_string());

        let ops = SystemProcessOperations::new();
        let mut cmd = ops.create_command("sh");
        cmd.args(["-c", "cat marker.txt; printf ' %s' \"$DEPBUILD_MARKER\"; printf ' [%s]' \"$HOME\""])
            .current_dir(dir.path())
            .envs(&env)
            .capture_output(true);

        let output = ops.execute_command(cmd).await.unwrap();
        assert!(output.success());
        assert_eq!(output.stdout_lossy(), "here marker-value []");
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_not_an_error() {
        let ops = SystemProcessOperations::new();
        let mut cmd = ops.create_command("sh");
        cmd.args(["-c", "exit 3"]).capture_output(true);

        let output = ops.execute_command(cmd).await.unwrap();
        assert!(!output.success());
        assert_eq!(output.exit_code, Some(3));
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let ops = SystemProcessOperations::new();
        let cmd = ops.create_command("/nonexistent/depbuild-no-such-tool");

        let err = ops.execute_command(cmd).await.unwrap_err();
        match err {
            depbuild_errors::Error::Platform(depbuild_errors::PlatformError::CommandNotFound {
                command,
            }) => assert_eq!(command, "/nonexistent/depbuild-no-such-tool"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
