//! Wires a small application with a root injector and a request scoped
//! child injector.
//!
//! Run with `RUST_LOG=debug cargo run -p elif-di --example car_engine` to see
//! the resolution log.

use elif_di::{
    Args, BoxError, DiEngine, DiError, FunctionRef, Injectable, ParamSpec, Provider, ProviderDecl,
    Token,
};
use std::sync::Arc;

struct Engine {
    horsepower: u32,
}

impl Injectable for Engine {
    fn params() -> Vec<ParamSpec> {
        vec![ParamSpec::token("horsepower")]
    }

    fn construct(args: &mut Args) -> Result<Self, BoxError> {
        Ok(Engine {
            horsepower: *args.next::<u32>()?,
        })
    }
}

struct Car {
    engine: Arc<Engine>,
    driver: Arc<String>,
}

impl Injectable for Car {
    fn params() -> Vec<ParamSpec> {
        vec![ParamSpec::of::<Engine>(), ParamSpec::token("driver")]
    }

    fn construct(args: &mut Args) -> Result<Self, BoxError> {
        Ok(Car {
            engine: args.next::<Engine>()?,
            driver: args.next::<String>()?,
        })
    }
}

fn main() -> Result<(), DiError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let engine = DiEngine::new();
    let app = engine.root(vec![
        ProviderDecl::class::<Engine>(),
        Provider::value("horsepower", 300u32).into(),
        Provider::value("plugins", "telemetry").multi().into(),
        Provider::value("plugins", "autopilot").multi().into(),
    ])?;

    let assign_driver = FunctionRef::new("assign_driver", Vec::new(), |_| Ok("Ada".to_string()));
    let request = app.resolve_and_create_child(vec![
        ProviderDecl::class::<Car>(),
        Provider::factory("driver", assign_driver).into(),
    ])?;

    let car = request.get_as::<Car>()?;
    println!("{} drives a car with {} hp", car.driver, car.engine.horsepower);

    let plugins = request.get_multi(&Token::from("plugins"))?;
    println!("{} plugin(s) installed", plugins.len());

    match app.get(&Token::of::<Car>()) {
        Err(error) => println!("The root scope cannot build a car: {}", error),
        Ok(_) => println!("Unexpected car in the root scope"),
    }

    Ok(())
}
