use std::sync::Arc;

use platform_exec::{COMMAND_SLOT, MODULE_NAME, PlatformExec};
use platform_exec_host::{CallContext, CallError, ExtensionRegistry, Module, Value};
use platform_exec_runner::{DryRunCommandExecutor, RawStatus};

const IDENTIFIER: &str = "lib/platform/exec";

fn load(ext: PlatformExec) -> (Arc<Module>, CallContext) {
    let mut registry = ExtensionRegistry::new();
    ext.register(&mut registry, IDENTIFIER).unwrap();
    let mut ctx = CallContext::new("test");
    let module = registry.import(&mut ctx, IDENTIFIER).unwrap();
    (module, ctx)
}

#[test]
fn imported_module_exposes_only_command() {
    let (module, _) = load(PlatformExec::default());

    assert_eq!(module.name(), MODULE_NAME);
    assert_eq!(module.identifier(), IDENTIFIER);
    assert!(module.imports().is_empty());
    assert_eq!(module.slot_count(), 1);
    assert_eq!(module.slot_names().collect::<Vec<_>>(), vec![COMMAND_SLOT]);
    assert!(module.get_slot(COMMAND_SLOT).and_then(Value::as_func).unwrap().is_unbound());
}

#[test]
fn wrong_arity_is_rejected_without_spawning() {
    let executor = DryRunCommandExecutor::new();
    let (module, mut ctx) = load(PlatformExec::new(Arc::new(executor.clone())));

    let none = module.call(&mut ctx, COMMAND_SLOT, &[]).unwrap_err();
    assert!(matches!(none, CallError::Arity { expected: 1, got: 0, .. }));

    let two = module
        .call(&mut ctx, COMMAND_SLOT, &[Value::from("true"), Value::from("true")])
        .unwrap_err();
    assert!(matches!(two, CallError::Arity { expected: 1, got: 2, .. }));

    assert_eq!(executor.invocation_count(), 0);
    assert_eq!(ctx.calls(), 0);
}

#[test]
fn non_string_argument_is_rejected_without_spawning() {
    let executor = DryRunCommandExecutor::new();
    let (module, mut ctx) = load(PlatformExec::new(Arc::new(executor.clone())));

    for arg in [Value::Int(0), Value::Null] {
        let err = module.call(&mut ctx, COMMAND_SLOT, &[arg]).unwrap_err();
        assert!(matches!(
            err,
            CallError::Type {
                position: 1,
                expected: "String",
                ..
            }
        ));
    }
    assert_eq!(executor.invocation_count(), 0);
}

#[test]
fn any_string_yields_an_int() {
    let executor = DryRunCommandExecutor::with_status(RawStatus::SPAWN_FAILED);
    let (module, mut ctx) = load(PlatformExec::new(Arc::new(executor.clone())));

    for cmd in ["", "   ", "echo \"unterminated", "ünïcödé"] {
        let out = module.call(&mut ctx, COMMAND_SLOT, &[Value::from(cmd)]).unwrap();
        assert_eq!(out, Value::Int(-1), "{cmd:?}");
    }
    assert_eq!(executor.invocation_count(), 4);
}

#[cfg(unix)]
mod shell {
    use std::fs;
    use std::thread;

    use platform_exec::ExecConfig;
    use platform_exec_runner::{ShellEnvironment, Termination};
    use tempfile::TempDir;

    use super::*;

    fn status(value: Value) -> RawStatus {
        let raw = value.as_int().expect("command returns an Int");
        RawStatus::from_raw(i32::try_from(raw).unwrap())
    }

    fn run(module: &Module, ctx: &mut CallContext, cmd: &str) -> RawStatus {
        status(module.call(ctx, COMMAND_SLOT, &[Value::from(cmd)]).unwrap())
    }

    #[test]
    fn true_false_and_exit_codes() {
        let (module, mut ctx) = load(PlatformExec::default());

        let ok = run(&module, &mut ctx, "true");
        assert!(ok.success());

        let failed = run(&module, &mut ctx, "false");
        assert_eq!(failed.termination(), Termination::Exited(1));
        assert_ne!(ok, failed);

        let seven = run(&module, &mut ctx, "exit 7");
        assert_eq!(seven.exit_code(), Some(7));
        assert_eq!(seven.raw(), 7 << 8);
    }

    #[test]
    fn system_executor_from_config() {
        let config = ExecConfig::from_toml_str("[shell]\nexecutor = \"system\"").unwrap();
        let (module, mut ctx) = load(PlatformExec::from_config(&config));
        assert_eq!(run(&module, &mut ctx, "exit 3").exit_code(), Some(3));
    }

    #[test]
    fn configured_environment_reaches_the_shell() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("marker"), "").unwrap();
        let config = ExecConfig {
            environment: ShellEnvironment::inherited()
                .with_var("PLATFORM_EXEC_GREETING", "hello")
                .with_working_dir(dir.path()),
            ..ExecConfig::default()
        };
        let (module, mut ctx) = load(PlatformExec::from_config(&config));

        let status = run(
            &module,
            &mut ctx,
            r#"test "$PLATFORM_EXEC_GREETING" = hello && test -f marker"#,
        );
        assert!(status.success());
    }

    #[test]
    fn sequential_calls_do_not_overlap() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("log");
        let (module, mut ctx) = load(PlatformExec::default());

        let first = format!(
            "echo start-1 >> '{0}'; sleep 0.2; echo end-1 >> '{0}'",
            log.display()
        );
        let second = format!("echo start-2 >> '{}'", log.display());
        assert!(run(&module, &mut ctx, &first).success());
        assert!(run(&module, &mut ctx, &second).success());

        let lines: Vec<_> = fs::read_to_string(&log)
            .unwrap()
            .lines()
            .map(str::to_owned)
            .collect();
        assert_eq!(lines, vec!["start-1", "end-1", "start-2"]);
    }

    #[test]
    fn threads_block_independently() {
        let (module, _) = load(PlatformExec::default());

        let handles: Vec<_> = (0..4)
            .map(|code| {
                let module = Arc::clone(&module);
                thread::spawn(move || {
                    let mut ctx = CallContext::for_current_thread();
                    run(&module, &mut ctx, &format!("sleep 0.1; exit {code}"))
                })
            })
            .collect();

        for (code, handle) in handles.into_iter().enumerate() {
            let status = handle.join().unwrap();
            assert_eq!(status.exit_code(), Some(i32::try_from(code).unwrap()));
        }
    }
}
