//! Integration tests for builder crate

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use depbuild_builder::*;
    use depbuild_config::Config;
    use depbuild_errors::{BuildError, Error};
    use depbuild_events::{channel, AppEvent, DownloadEvent, PackageEvent};
    use depbuild_hash::Hash;
    use depbuild_net::NetClient;
    use depbuild_platform::{
        CommandOutput, PlatformCommand, ProcessOperations, SystemProcessOperations,
    };
    use httpmock::prelude::*;
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    /// Runs `tar` for real and records everything else as a success
    #[derive(Clone, Default)]
    struct TarOnlyRunner {
        calls: Arc<Mutex<Vec<PlatformCommand>>>,
    }

    impl TarOnlyRunner {
        fn build_calls(&self) -> Vec<PlatformCommand> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|cmd| cmd.program() != "tar")
                .cloned()
                .collect()
        }
    }

    #[async_trait]
    impl ProcessOperations for TarOnlyRunner {
        async fn execute_command(&self, cmd: PlatformCommand) -> Result<CommandOutput, Error> {
            self.calls.lock().unwrap().push(cmd.clone());
            if cmd.program() == "tar" {
                return SystemProcessOperations.execute_command(cmd).await;
            }
            Ok(CommandOutput {
                exit_code: Some(0),
                ..CommandOutput::default()
            })
        }
    }

    fn tar_bytes(top: &str, files: &[(&str, &str)]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (name, contents) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(contents.len() as u64);
            header.set_mode(0o644);
            builder
                .append_data(&mut header, format!("{top}/{name}"), contents.as_bytes())
                .unwrap();
        }
        builder.into_inner().unwrap()
    }

    async fn context(root: &Path, runner: TarOnlyRunner) -> (BuildContext, depbuild_events::EventReceiver) {
        let mut config = Config::default();
        config.paths.root = Some(root.to_path_buf());

        let env = BuildEnvironment::new(
            &config,
            vec![("PATH".to_string(), "/usr/bin:/bin".to_string())],
            CmakeTool::Detected("cmake".to_string()),
        );
        env.create_directories().await.unwrap();

        let (tx, rx) = channel();
        let ctx = BuildContext::new(env, NetClient::with_defaults().unwrap(), Arc::new(runner), tx);
        (ctx, rx)
    }

    #[tokio::test]
    async fn test_cached_archive_skips_network() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/mylib-1.2.tar");
            then.status(200).body("unexpected");
        });

        let root = tempdir().unwrap();
        let runner = TarOnlyRunner::default();
        let (ctx, _rx) = context(root.path(), runner.clone()).await;

        let data = tar_bytes("mylib-1.2", &[("README", "cached"), ("configure", "#!/bin/sh")]);
        std::fs::write(ctx.env().build_dir().join("mylib-1.2.tar"), &data).unwrap();

        let package = Package::new(
            "mylib",
            server.url("/mylib-1.2.tar"),
            &Hash::from_data(&data).to_hex(),
        )
        .unwrap()
        .with_commands(CommandChain::tool(NO_ARGS));

        let work_dir = package.build(&ctx).await.unwrap();

        mock.assert_hits(0);
        assert_eq!(work_dir, ctx.env().build_dir().join("mylib-1.2"));
        assert_eq!(
            std::fs::read_to_string(work_dir.join("README")).unwrap(),
            "cached"
        );

        let calls = runner.build_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].program(), "./configure");
        assert_eq!(
            calls[0].get_args(),
            [format!("--prefix={}", ctx.env().prefix().display())]
        );
        assert_eq!(calls[1].command_line(), "make install");
        for call in &calls {
            assert_eq!(call.get_current_dir(), Some(&work_dir));
            let env = call.get_env_vars().unwrap();
            assert!(env["CFLAGS"].ends_with(&format!("-I{}", ctx.env().include_dir().display())));
            assert!(env["PATH"].starts_with(&ctx.env().bin_dir().display().to_string()));
        }
    }

    #[tokio::test]
    async fn test_download_verify_extract_build() {
        let data = tar_bytes("libogg-1.3.4", &[("configure", "#!/bin/sh"), ("ogg.h", "")]);
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/releases/ogg/libogg-1.3.4.tar");
            then.status(200).body(data.clone());
        });

        let root = tempdir().unwrap();
        let runner = TarOnlyRunner::default();
        let (ctx, mut rx) = context(root.path(), runner.clone()).await;

        let registry = PackageRegistry::new(vec![Package::new(
            "ogg",
            server.url("/releases/ogg/libogg-1.3.4.tar"),
            &Hash::from_data(&data).to_hex(),
        )
        .unwrap()]);

        let summary = registry.build_all(&ctx).await.unwrap();

        mock.assert_hits(1);
        assert_eq!(summary.built, ["ogg"]);
        let archive = ctx.env().build_dir().join("libogg-1.3.4.tar");
        assert_eq!(std::fs::read(&archive).unwrap(), data);
        assert!(ctx.env().build_dir().join("libogg-1.3.4/ogg.h").is_file());

        let calls = runner.build_calls();
        assert_eq!(calls[0].get_args()[1], "--enable-static");
        assert_eq!(calls[1].command_line(), "make install");

        let mut saw_download = false;
        let mut saw_banner = false;
        while let Ok(event) = rx.try_recv() {
            match event {
                AppEvent::Download(DownloadEvent::Completed { filename, .. }) => {
                    assert_eq!(filename, "libogg-1.3.4.tar");
                    saw_download = true;
                }
                AppEvent::Package(PackageEvent::Banner { name }) => {
                    assert_eq!(name, "ogg");
                    saw_banner = true;
                }
                _ => {}
            }
        }
        assert!(saw_download);
        assert!(saw_banner);
    }

    #[tokio::test]
    async fn test_downloaded_archive_with_wrong_checksum_aborts() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/SDL2-2.0.9.tar.gz");
            then.status(200).body("tampered");
        });

        let root = tempdir().unwrap();
        let runner = TarOnlyRunner::default();
        let (ctx, _rx) = context(root.path(), runner.clone()).await;

        let registry = PackageRegistry::new(vec![
            Package::new(
                "SDL2",
                server.url("/SDL2-2.0.9.tar.gz"),
                "255186dc676ecd0c1dbf10ec8a2cc5d6869b5079d8a38194c2aecdff54b324b1",
            )
            .unwrap(),
            Package::new(
                "SDL2_net",
                server.url("/SDL2_net-2.0.1.tar.gz"),
                "15ce8a7e5a23dafe8177c8df6e6c79b6749a03fff1e8196742d3571657609d21",
            )
            .unwrap(),
        ]);

        let err = registry.build_all(&ctx).await.unwrap_err();
        match err {
            Error::Build(BuildError::HashMismatch { file, .. }) => {
                assert_eq!(file, "SDL2-2.0.9.tar.gz");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(runner.calls.lock().unwrap().is_empty());
    }
}
