//! Integration tests for CLI commands

use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Helper to run kubeyaml command
fn kubeyaml(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_kubeyaml"))
        .args(args)
        .env_remove("KUBEYAML_LOG")
        .output()
        .expect("Failed to execute kubeyaml")
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

const DEPLOYMENT: &str = r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: {{ name }}
spec:
  replicas: {{ replicas }}
  template:
    spec:
      containers:
        - name: {{ name }}
          image: "{{ image.repository }}:{{ image.tag }}"
"#;

const VALUES: &str = r#"name: web
replicas: 1
image:
  repository: nginx
  tag: "1.25"
"#;

mod render_command {
    use super::*;

    #[test]
    fn test_render_with_values() {
        let dir = TempDir::new().unwrap();
        let template = write(dir.path(), "deploy.yaml.j2", DEPLOYMENT);
        let values = write(dir.path(), "values.yaml", VALUES);

        let output = kubeyaml(&["render", arg(&template), "-f", arg(&values)]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("  name: web\n"));
        assert!(stdout.contains("image: \"nginx:1.25\""));
    }

    #[test]
    fn test_set_overrides_values_file() {
        let dir = TempDir::new().unwrap();
        let template = write(dir.path(), "deploy.yaml.j2", DEPLOYMENT);
        let values = write(dir.path(), "values.yaml", VALUES);

        let output = kubeyaml(&[
            "render",
            arg(&template),
            "-f",
            arg(&values),
            "--set",
            "replicas=3",
            "--set",
            "image.tag=1.26",
        ]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("replicas: 3\n"));
        assert!(stdout.contains("nginx:1.26"));
    }

    #[test]
    fn test_later_values_file_wins() {
        let dir = TempDir::new().unwrap();
        let template = write(dir.path(), "t.j2", "name: {{ name }}\n");
        let base = write(dir.path(), "base.yaml", "name: base\n");
        let prod = write(dir.path(), "prod.yaml", "name: prod\n");

        let output = kubeyaml(&["render", arg(&template), "-f", arg(&base), "-f", arg(&prod)]);

        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout), "name: prod\n");
    }

    #[test]
    fn test_undefined_variable_exit_code() {
        let dir = TempDir::new().unwrap();
        let template = write(dir.path(), "t.j2", "name: {{ nmae }}\n");

        let output = kubeyaml(&["render", arg(&template), "--set", "name=web"]);

        assert_eq!(output.status.code(), Some(3));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("undefined"));
    }

    #[test]
    fn test_lenient_renders_undefined_as_empty() {
        let dir = TempDir::new().unwrap();
        let template = write(dir.path(), "t.j2", "name: {{ missing }}\n");

        let output = kubeyaml(&["render", arg(&template), "--lenient"]);

        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout), "name: \n");
    }

    #[test]
    fn test_multiline_value_stays_one_scalar() {
        let dir = TempDir::new().unwrap();
        let template = write(dir.path(), "t.j2", "motd: {{ motd }}\nnext: 1\n");
        let values = write(dir.path(), "values.yaml", "motd: |\n  hello\n  world\n");

        let output = kubeyaml(&["render", arg(&template), "-f", arg(&values), "--check"]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert_eq!(stdout, "motd: |\n  hello\n  world\nnext: 1\n");
    }

    #[test]
    fn test_check_rejects_non_mapping_output() {
        let dir = TempDir::new().unwrap();
        let template = write(dir.path(), "t.j2", "- {{ a }}\n- {{ b }}\n");

        let output = kubeyaml(&[
            "render",
            arg(&template),
            "--set",
            "a=1",
            "--set",
            "b=2",
            "--check",
        ]);

        assert_eq!(output.status.code(), Some(4));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("mapping"));
    }

    #[test]
    fn test_render_to_output_file() {
        let dir = TempDir::new().unwrap();
        let template = write(dir.path(), "t.j2", "a: {{ a }}\n");
        let out = dir.path().join("out.yaml");

        let output = kubeyaml(&["render", arg(&template), "--set", "a=1", "-o", arg(&out)]);

        assert!(output.status.success());
        assert!(output.stdout.is_empty());
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "a: 1\n");
    }

    #[test]
    fn test_missing_template_exit_code() {
        let output = kubeyaml(&["render", "/definitely/not/here.j2"]);
        assert_eq!(output.status.code(), Some(5));
    }

    #[test]
    fn test_bad_set_syntax() {
        let dir = TempDir::new().unwrap();
        let template = write(dir.path(), "t.j2", "a: 1\n");

        let output = kubeyaml(&["render", arg(&template), "--set", "novalue"]);
        assert_eq!(output.status.code(), Some(1));
    }
}

mod fmt_command {
    use super::*;

    #[test]
    fn test_fmt_normalizes_stream() {
        let dir = TempDir::new().unwrap();
        let file = write(
            dir.path(),
            "in.yaml",
            "---\nkind: ConfigMap\ndata: {a: '1', b: 'yes'}\nlist: [x, y]\n---\n---\nkind: Secret\n",
        );

        let output = kubeyaml(&["fmt", arg(&file)]);

        assert!(output.status.success());
        assert_eq!(
            String::from_utf8_lossy(&output.stdout),
            "kind: ConfigMap\ndata:\n  a: '1'\n  b: 'yes'\nlist:\n  - x\n  - 'y'\n---\nkind: Secret\n"
        );
    }

    #[test]
    fn test_fmt_invalid_yaml_exit_code() {
        let dir = TempDir::new().unwrap();
        let file = write(dir.path(), "bad.yaml", "a: [1, 2\n");

        let output = kubeyaml(&["fmt", arg(&file)]);
        assert_eq!(output.status.code(), Some(4));
    }
}

mod get_command {
    use super::*;

    const STREAM: &str = "kind: Service\nmetadata:\n  name: web\n---\nkind: Deployment\nspec:\n  replicas: 2\n  ports: [80, 443]\n";

    #[test]
    fn test_get_scalar() {
        let dir = TempDir::new().unwrap();
        let file = write(dir.path(), "s.yaml", STREAM);

        let output = kubeyaml(&["get", arg(&file), "metadata.name"]);

        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout), "web\n");
    }

    #[test]
    fn test_get_from_second_document() {
        let dir = TempDir::new().unwrap();
        let file = write(dir.path(), "s.yaml", STREAM);

        let output = kubeyaml(&["get", arg(&file), "spec.ports", "-d", "1"]);

        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout), "- 80\n- 443\n");
    }

    #[test]
    fn test_get_missing_path() {
        let dir = TempDir::new().unwrap();
        let file = write(dir.path(), "s.yaml", STREAM);

        let output = kubeyaml(&["get", arg(&file), "spec.nope"]);

        assert_eq!(output.status.code(), Some(4));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("spec.nope"));
    }

    #[test]
    fn test_get_document_out_of_range() {
        let dir = TempDir::new().unwrap();
        let file = write(dir.path(), "s.yaml", STREAM);

        let output = kubeyaml(&["get", arg(&file), "kind", "-d", "7"]);
        assert_eq!(output.status.code(), Some(4));
    }
}
