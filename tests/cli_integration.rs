// End-to-end tests of the glslpack binary.

use std::process::Command;

use tempfile::tempdir;

fn bin() -> String {
    env!("CARGO_BIN_EXE_glslpack").to_string()
}

const SCENE: &str = "#version 330 core\n\
    uniform vec2 resolution;\n\
    uniform float time;\n\
    void main(){vec2 p=gl_FragCoord.xy/resolution;gl_FragColor=vec4(p,time,1.);}\n";

const POST: &str = "#version 330 core\n\
    uniform vec2 resolution;\n\
    void main(){vec2 p=gl_FragCoord.xy/resolution;gl_FragColor=vec4(p,0.,1.);}\n";

#[test]
fn cli_packs_shaders_and_writes_artifacts() {
    let dir = tempdir().unwrap();
    let scene = dir.path().join("scene.frag");
    let post = dir.path().join("post.frag");
    std::fs::write(&scene, SCENE).unwrap();
    std::fs::write(&post, POST).unwrap();

    let pack = dir.path().join("shaders.pack");
    let header = dir.path().join("unpacker.h");
    let source = dir.path().join("unpacker.c");

    let st = Command::new(bin())
        .arg(&scene)
        .arg(&post)
        .arg("-p")
        .arg(&pack)
        .arg("--output-header")
        .arg(&header)
        .arg("-c")
        .arg(&source)
        .status()
        .unwrap();
    assert!(st.success());

    assert!(std::fs::metadata(&pack).unwrap().len() > 0);
    let header_text = std::fs::read_to_string(&header).unwrap();
    assert!(header_text.contains("shader_scene"));
    assert!(header_text.contains("shader_post"));
    assert!(header_text.contains("extern const char* uniform_resolution;"));
    assert!(header_text.contains("extern const char* uniform_time;"));
    let source_text = std::fs::read_to_string(&source).unwrap();
    assert!(source_text.contains("\"#version 330 core\\n\""));
    assert!(source_text.contains("char* shader_unpack("));
}

#[test]
fn cli_json_stats_go_to_stderr() {
    let dir = tempdir().unwrap();
    let shader = dir.path().join("a.frag");
    std::fs::write(&shader, SCENE).unwrap();

    let out = Command::new(bin())
        .current_dir(dir.path())
        .arg(&shader)
        .arg("--json")
        .output()
        .unwrap();
    assert!(out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("\"packed_bytes\""));
    assert!(stderr.contains("\"assets\": 1"));
}

#[test]
fn cli_rejects_inconsistent_token_bounds() {
    let dir = tempdir().unwrap();
    let shader = dir.path().join("a.frag");
    std::fs::write(&shader, SCENE).unwrap();

    let st = Command::new(bin())
        .current_dir(dir.path())
        .arg(&shader)
        .args(["--min-token-size", "8", "--max-token-size", "4"])
        .status()
        .unwrap();
    assert!(!st.success());
}

#[test]
fn cli_rejects_non_ascii_input() {
    let dir = tempdir().unwrap();
    let shader = dir.path().join("bad.frag");
    std::fs::write(&shader, b"void main(){}\xFF\n").unwrap();

    let out = Command::new(bin())
        .current_dir(dir.path())
        .arg(&shader)
        .output()
        .unwrap();
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("non-ASCII"));
}

#[test]
fn cli_enforces_the_version_ceiling() {
    let dir = tempdir().unwrap();
    let shader = dir.path().join("new.frag");
    std::fs::write(&shader, "#version 460\nvoid main(){}\n").unwrap();

    let out = Command::new(bin())
        .current_dir(dir.path())
        .arg(&shader)
        .args(["--glsl-version", "330"])
        .output()
        .unwrap();
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("exceeds"));
}

#[test]
fn cli_without_arguments_prints_usage() {
    let out = Command::new(bin()).output().unwrap();
    assert!(!out.status.success());
    let combined = format!(
        "{}{}",
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr)
    );
    assert!(combined.contains("Usage"));
}
