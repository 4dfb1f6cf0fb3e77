//! Deployment lifecycle example for scoped-registry.
//!
//! Demonstrates:
//! - Building per-deployment singletons from a `FactoryCatalog`
//! - Publishing them under well-known names in a `NamingDirectory`
//! - Observing both components with trace callbacks
//! - Tearing a deployment down with `unbind` and `evict_unit`
//!
//! Run with: `cargo run --example deployment_lifecycle`

use scoped_registry::{FactoryCatalog, IsolationUnit, NamingDirectory, SingletonRegistry};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct BeanManager {
    beans: Mutex<Vec<&'static str>>,
}

#[derive(Debug, Default)]
struct ConversationManager;

fn main() {
    println!("=== scoped-registry: Deployment Lifecycle ===\n");

    let mut catalog = FactoryCatalog::new();
    catalog
        .register::<BeanManager>("BeanManager")
        .register::<ConversationManager>("ConversationManager");

    let registry = SingletonRegistry::new();
    let directory = NamingDirectory::new();

    registry.set_trace_callback(|event| println!("   [registry] {event}"));
    directory.set_trace_callback(|event| println!("   [naming]   {event}"));

    // -------------------------------------------------------------------------
    // 1. Deploy two applications
    // -------------------------------------------------------------------------
    println!("1. Deploying shop and admin...");

    let shop = IsolationUnit::issue();
    let admin = IsolationUnit::issue();

    for (unit, app) in [(&shop, "shop"), (&admin, "admin")] {
        let manager = match registry.get_singleton(unit, "BeanManager", &catalog) {
            Ok(manager) => manager,
            Err(e) => {
                eprintln!("   deploy of {app} failed: {e}");
                return;
            }
        };
        if let Err(e) = directory.bind(&format!("java:global/{app}/BeanManager"), manager) {
            eprintln!("   publishing {app} failed: {e}");
        }
    }

    // -------------------------------------------------------------------------
    // 2. Resolve by name from "another component"
    // -------------------------------------------------------------------------
    println!("\n2. Resolving java:global/shop/BeanManager...");

    match directory.lookup_as::<BeanManager>("java:global/shop/BeanManager") {
        Ok(manager) => {
            if let Ok(mut beans) = manager.beans.lock() {
                beans.push("CartBean");
            }
            println!("   shop beans: {:?}", manager.beans);
        }
        Err(e) => println!("   lookup failed: {e}"),
    }

    // -------------------------------------------------------------------------
    // 3. Singletons are private to each deployment
    // -------------------------------------------------------------------------
    println!("\n3. Comparing deployments...");

    let same = registry
        .get_singleton(&shop, "BeanManager", &catalog)
        .ok()
        .zip(registry.get_singleton(&admin, "BeanManager", &catalog).ok())
        .is_some_and(|(a, b)| Arc::ptr_eq(&a, &b));
    println!("   shop and admin share a BeanManager: {same}");

    // -------------------------------------------------------------------------
    // 4. Failures are reported, not cached
    // -------------------------------------------------------------------------
    println!("\n4. Requesting an unknown singleton...");

    if let Err(e) = registry.get_singleton(&shop, "Mailer", &catalog) {
        println!("   error (expected): {e}");
    }
    if let Err(e) = directory.bind("java:global/shop/BeanManager/extra", Arc::new(1u8)) {
        println!("   error (expected): {e}");
    }

    // -------------------------------------------------------------------------
    // 5. Undeploy shop
    // -------------------------------------------------------------------------
    println!("\n5. Undeploying shop...");

    if let Err(e) = directory.unbind("java:global/shop") {
        println!("   unbind failed: {e}");
    }
    let removed = registry.evict_unit(&shop);
    println!("   removed {removed} singleton(s)");

    println!("\n=== Example Complete ===");
    println!(
        "Remaining: {} unit(s), names under java:global: {:?}",
        registry.unit_count(),
        directory.list("java:global").unwrap_or_default()
    );
}
