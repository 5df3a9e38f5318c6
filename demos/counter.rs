//! A counter component bound to an atomic store

use atomic_state::{
    action, action_with, compose_with, record, Action, ActionWith, AtomicConfig, AtomicError,
    Overrides,
};

record! {
    #[derive(Clone, Debug)]
    struct CounterState => CounterStatePartial {
        count: i32,
        step: i32,
        history: Vec<i32>,
    }
}

record! {
    #[derive(Clone)]
    struct CounterActions => CounterActionsPartial {
        increment: Action,
        decrement: Action,
        set_step: ActionWith<i32>,
        reset: Action,
    }
}

record! {
    #[derive(Clone)]
    struct Helpers => HelpersPartial {
        format_count: std::sync::Arc<dyn Fn(i32) -> String + Send + Sync>,
    }
}

fn main() -> Result<(), AtomicError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== Atomic Counter ===\n");

    let counter = compose_with(
        AtomicConfig::named("Counter"),
        CounterState {
            count: 0,
            step: 1,
            history: vec![0],
        },
        |set, get, _helpers| {
            let shift = {
                let set = set.clone();
                let get = get.clone();
                move |sign: i32| {
                    let current = get.get();
                    let count = current.count + sign * current.step;
                    let mut history = current.history;
                    history.push(count);
                    set.mutate(CounterStatePartial {
                        count: Some(count),
                        history: Some(history),
                        ..Default::default()
                    });
                }
            };
            let down = shift.clone();
            let step = set.clone();
            Ok(CounterActions {
                increment: action(move || shift(1)),
                decrement: action(move || down(-1)),
                set_step: action_with(move |value| {
                    step.mutate(CounterStatePartial {
                        step: Some(value),
                        ..Default::default()
                    })
                }),
                reset: action(move || {
                    set.mutate_with(|state| {
                        let mut history = state.history.clone();
                        history.push(0);
                        CounterStatePartial {
                            count: Some(0),
                            history: Some(history),
                            ..Default::default()
                        }
                    })
                }),
            })
        },
        Helpers {
            format_count: std::sync::Arc::new(|count| format!("[{count:>4}]")),
        },
        |props| {
            format!(
                "{} step {} ({} changes)",
                (props.functions.format_count)(props.state.count),
                props.state.step,
                props.state.history.len() - 1
            )
        },
    )?;

    println!("1. Mounting {}", counter.component().display_name());
    let root = counter.component().mount(Overrides::none());
    println!("   {}", root.output().unwrap_or_default());

    println!("\n2. Subscribing a selector to the sign of the count");
    let sign = counter.select(|props| props.state.count.signum());

    let actions = counter.get().actions;
    println!("\n3. Increment twice, then step 5 and decrement");
    (actions.increment)();
    (actions.increment)();
    (actions.set_step)(5);
    (actions.decrement)();
    println!("   {}", root.output().unwrap_or_default());
    println!("   sign: {}", sign.get());

    println!("\n4. Reset");
    (actions.reset)();
    println!("   {}", root.output().unwrap_or_default());
    println!("   rendered {} times", root.render_count());

    println!("\n=== Done ===");
    Ok(())
}
