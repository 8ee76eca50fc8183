//! Signup Example
//!
//! Drives a small signup form by hand:
//! - a required name with a length window
//! - an email validated on blur
//! - a required terms checkbox
//! - a single select
//!
//! Logs go to `signup.log`.

use std::fs::File;
use std::time::Duration;

use formgate::prelude::*;
use log::LevelFilter;
use simplelog::{Config, WriteLogger};

/// A text input that registers itself with the form it is built for.
struct TextInput {
    value: ValueCell,
    signals: InteractionSignals,
    field: Field,
}

impl TextInput {
    fn new(registry: &FormRegistry, id: &str, rules: Rules) -> Result<Self, FormError> {
        let value = ValueCell::new("");
        let field = registry.register_field(id, &value, rules, FieldOptions::default())?;
        Ok(Self {
            value,
            signals: InteractionSignals::new(),
            field,
        })
    }

    fn type_text(&self, text: &str) {
        self.signals.focus();
        self.value.set(text);
    }
}

fn report(form: &Form) {
    for field in form.fields() {
        println!("  {:<8} {:<8} {:?}", field.id(), field.validity(), field.value());
    }
    println!("  form valid: {}", form.is_valid());
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let log_file = File::create("signup.log")?;
    let _ = WriteLogger::init(LevelFilter::Debug, Config::default(), log_file);

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let delay = Duration::from_millis(200);
    let form = Form::with_tokio(FormOptions::new().on_blur(true).validation_delay(delay), tx)?;
    let registry = form.registry();

    let name = TextInput::new(&registry, "name", Rules::new().required().min(2).max(32))?;
    let email = TextInput::new(&registry, "email", Rules::new().required().strict_email())?;

    let terms = ValueCell::new(false);
    registry.register_field(
        "terms",
        &terms,
        Rules::new().required(),
        FieldOptions::new().override_on_blur().immediate(),
    )?;

    let plan = ValueCell::new(SelectItem::new("Choose a plan", FieldValue::Null));
    registry.register_field("plan", &plan, Rules::new().required(), FieldOptions::default())?;

    let mut interactions = InteractionMap::new();
    interactions.insert("name", name.signals.clone());
    interactions.insert("email", email.signals.clone());
    form.mount(&interactions)?;

    println!("Submitting empty form:");
    form.submit();
    report(&form);

    println!("\nFilling in:");
    name.type_text("Ada");
    email.type_text("ada@");
    email.signals.blur();
    email.type_text("ada@example.com");
    terms.set(true);
    plan.set(SelectItem::new("Pro", "pro"));
    tokio::time::sleep(delay * 2).await;
    report(&form);
    println!("  email touched: {}", email.field.is_touched());

    form.submit();
    form.reset();
    form.unmount();
    drop(form);

    while let Some(event) = rx.recv().await {
        println!("event: {}", event);
    }

    Ok(())
}
