//! `drydock products` command

use anyhow::Result;

use drydock::{PhaseBlock, ProductRegistry};

pub fn execute() -> Result<()> {
    let registry = ProductRegistry::builtin();

    for product in registry.iter() {
        let deps = product.dependencies();
        println!("{:<8} {}", product.name(), product.description());
        println!("         runs {}", PhaseBlock::of(product));
        if !deps.is_empty() {
            println!("         depends on {}", deps.join(", "));
        }
    }

    Ok(())
}
