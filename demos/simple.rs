use std::{sync::Arc, time::SystemTime};

use musubi::*;

// Define regular traits and implementor structs

trait Logger: Send + Sync {
    fn log(&self, content: &str);
}

trait DateLogger: Send + Sync {
    fn log_date(&self);
}

#[derive(Default)]
struct LoggerImpl;

impl Logger for LoggerImpl {
    fn log(&self, content: &str) {
        println!("{}", content);
    }
}

struct DateLoggerImpl {
    logger: Arc<dyn Logger>,
    prefix: String,
}

impl DateLoggerImpl {
    fn new(logger: Arc<dyn Logger>) -> Self {
        Self::with_prefix(logger, Named::new(String::new()))
    }

    fn with_prefix(logger: Arc<dyn Logger>, prefix: Named<String, Prefix>) -> Self {
        Self {
            logger,
            prefix: prefix.into_inner(),
        }
    }
}

impl DateLogger for DateLoggerImpl {
    fn log_date(&self) {
        let secs = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|now| now.as_secs())
            .unwrap_or_default();
        self.logger
            .log(&format!("{}{}s since epoch", self.prefix, secs));
    }
}

struct Prefix;

// Declare how to construct the implementors and which traits they implement

injectable!(LoggerImpl);
injectable!(DateLoggerImpl => [DateLoggerImpl::new, DateLoggerImpl::with_prefix]);
interface!(dyn Logger => LoggerImpl);
interface!(dyn DateLogger => DateLoggerImpl);

// Group the logging bindings in a module

struct LogModule;

impl Module for LogModule {
    fn configure(&self, builder: InjectorBuilder) -> InjectorBuilder {
        builder
            .bind(bind::<dyn Logger>().to_type::<LoggerImpl>().in_scope(Singleton))
            .bind(bind::<dyn DateLogger>().to_type::<DateLoggerImpl>())
    }
}

fn main() -> Result<(), InjectError> {
    let injector = Injector::builder()
        .module(&LogModule)
        .bind(bind::<String>().named(Prefix).to(String::from("[demo] ")))
        .build();

    let b: Arc<dyn DateLogger> = injector.create()?;
    b.log_date();

    Ok(())
}
