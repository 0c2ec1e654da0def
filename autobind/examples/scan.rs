//! Scans a small application and prints what got registered.
//!
//! ```text
//! cargo run -p autobind --example scan
//! ```

use autobind::prelude::*;
use autobind::register_type;

mod app {
    pub mod contracts {
        use autobind::prelude::*;
        use autobind::register_type;

        pub trait Clock {}
        pub trait Mailer {}
        pub trait AuditLog {}
        pub trait Handler<M> {}
        pub struct HandlerDef;

        fn clock() -> TypeDescriptor {
            TypeDescriptor::interface::<dyn Clock>()
        }
        fn mailer() -> TypeDescriptor {
            TypeDescriptor::interface::<dyn Mailer>()
        }
        fn audit_log() -> TypeDescriptor {
            TypeDescriptor::interface::<dyn AuditLog>()
        }
        fn handler_def() -> TypeDescriptor {
            TypeDescriptor::open_interface::<HandlerDef>(1)
        }
        fn signup_handler() -> TypeDescriptor {
            TypeDescriptor::interface::<dyn Handler<String>>()
                .instantiates::<HandlerDef>([TypeKey::of::<String>()])
        }

        register_type!(clock);
        register_type!(mailer);
        register_type!(audit_log);
        register_type!(handler_def);
        register_type!(signup_handler);
    }

    pub mod services {
        use super::contracts::{AuditLog, Clock, Handler, Mailer};
        use autobind::prelude::*;
        use autobind::register_type;

        pub struct SystemClock;
        pub struct SmtpMailer;
        pub struct AuditedMailer;
        pub struct SignupHandler;
        pub struct MailerBase;

        fn system_clock() -> TypeDescriptor {
            TypeDescriptor::class::<SystemClock>().implements::<dyn Clock>()
        }
        fn mailer_base() -> TypeDescriptor {
            TypeDescriptor::abstract_class::<MailerBase>().implements::<dyn Mailer>()
        }
        fn smtp_mailer() -> TypeDescriptor {
            TypeDescriptor::class::<SmtpMailer>().extends::<MailerBase>()
        }
        fn audited_mailer() -> TypeDescriptor {
            TypeDescriptor::class::<AuditedMailer>()
                .extends::<SmtpMailer>()
                .implements::<dyn AuditLog>()
        }
        fn signup_handler() -> TypeDescriptor {
            TypeDescriptor::class::<SignupHandler>().implements::<dyn Handler<String>>()
        }

        register_type!(system_clock);
        register_type!(mailer_base);
        register_type!(smtp_mailer);
        register_type!(audited_mailer);
        register_type!(signup_handler);
    }
}

struct Banner;

fn banner() -> TypeDescriptor {
    TypeDescriptor::class::<Banner>()
}

register_type!(banner);

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("autobind_container=debug")
        .init();

    let universe = TypeUniverse::discover()?;
    println!("Discovered {} type(s)", universe.len());

    let container = InMemoryContainer::builder()
        .default_lifecycle(Lifecycle::Scoped)
        .build();

    let services = AutoRegistration::in_module_of::<app::services::SystemClock>(&container, &universe)?
        .all_types();
    println!("Eligible services: {}", services.types().len());
    let report = services.by_class_and_interface()?;
    println!("{report}");

    let handlers = AutoRegistration::in_module(&container, &universe, module_path!())
        .that_implement_open_type(TypeKey::of::<app::contracts::HandlerDef>())
        .by_class_and_interface_with(Lifecycle::Transient)?;
    println!("{handlers}");

    container.verify()?;
    tracing::info!(registrations = container.len(), "Composition root ready");
    println!("{}", container.describe());

    Ok(())
}
