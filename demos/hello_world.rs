use mock_vfs::{FsBackend, MockFS, OpenMode, activate, ambient};
use serde_json::json;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Loads `name` from `/etc` and then from the user's home, the later one winning.
/// Written against the ambient functions, so it runs on whatever file system is active.
fn load_config(name: &str) -> anyhow::Result<serde_json::Value> {
    let mut config = json!({});
    for dir in ["/etc", "~"] {
        let path = ambient::expand_user(&format!("{dir}/{name}"));
        if !ambient::is_file(&path) {
            continue;
        }
        let layer: serde_json::Value = serde_json::from_str(&ambient::read_to_string(&path)?)?;
        if let (Some(config), Some(layer)) = (config.as_object_mut(), layer.as_object()) {
            config.extend(layer.clone());
        }
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("mock_vfs=debug".parse()?))
        .with(fmt::layer().with_target(true))
        .init();

    // `/etc/app1.json` and `/home/douglas/app1.json` only exist in memory
    let fs = MockFS::from_json(json!({
        "etc": { "app1.json": r#"{"greeting": "Hello", "name": "nobody"}"# },
        "home": { "douglas": { "app1.json": r#"{"name": "World"}"# } }
    }))?;

    let config = {
        // everything in `ambient` goes to `fs` until `_scope` is dropped
        let _scope = activate(fs.clone());
        let config = load_config("app1.json")?;

        let mut log = ambient::open("/home/douglas/greetings.log", OpenMode::Append)?;
        log.write(&format!("{} {}\n", config["greeting"], config["name"]))?;
        log.close()?;
        config
    };

    println!(
        "{}, {}!",
        config["greeting"].as_str().unwrap_or_default(),
        config["name"].as_str().unwrap_or_default()
    );

    // the tree is still there for inspection
    for name in fs.ls("/home/douglas")? {
        println!("/home/douglas/{name}");
    }
    println!("{}", serde_json::to_string_pretty(&fs.to_json())?);

    Ok(())
}
