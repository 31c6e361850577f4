//! `toolloop tools`: list the built-in tools.

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let registry = toolloop_tools::default_registry();
    println!("Built-in tools ({}):", registry.len());
    println!();
    for def in registry.describe_all() {
        println!("  {:<14} {}", def.name, def.description);
        println!("  {:<14} schema: {}", "", serde_json::to_string(&def.parameters)?);
    }
    Ok(())
}
