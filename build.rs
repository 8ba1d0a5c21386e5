use std::env;
use std::fs;
use std::path::Path;

fn main() {
    // Embed the Windows manifest that declares per-monitor DPI awareness, so
    // window and virtual-screen coordinates are physical pixels
    let _ = embed_resource::compile("quick-screenshot.rc", embed_resource::NONE);
    println!("cargo:rerun-if-changed=quick-screenshot.rc");
    println!("cargo:rerun-if-changed=quick-screenshot.exe.manifest");

    copy_config();
}

/// Copies config.json to the target directory so the executable finds it.
fn copy_config() {
    let Ok(out_dir) = env::var("OUT_DIR") else {
        return;
    };
    // OUT_DIR is something like target/release/build/quick-screenshot-xxx/out
    let Some(target_dir) = Path::new(&out_dir).ancestors().nth(3) else {
        return;
    };

    let config_src = Path::new("config.json");
    if config_src.exists() {
        let _ = fs::copy(config_src, target_dir.join("config.json"));
        println!("cargo:rerun-if-changed=config.json");
    }
}
