use std::sync::Arc;

use common::AggregateId;
use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use domain::{
    ActivateUser, Aggregate, AggregateHistory, DisableUser, EnableUser, InMemoryEventBus, Login,
    LoginFingerprint, Password, PasswordHash, RegisterUser, User, UserEvent, UserService,
};
use event_store::InMemoryEventStore;

type Service = UserService<InMemoryEventStore, Arc<InMemoryEventBus<UserEvent>>>;

fn service() -> Service {
    UserService::new(InMemoryEventStore::new(), Arc::new(InMemoryEventBus::new()))
}

/// Registration followed by `toggles` disable/enable pairs.
fn history(id: AggregateId, toggles: usize) -> Vec<UserEvent> {
    let password = Password::new("correct horse").unwrap();
    let mut events = vec![
        UserEvent::registered(
            id,
            Login::new("alice").unwrap(),
            PasswordHash::from_password(&password),
        ),
        UserEvent::activated(id),
    ];
    for _ in 0..toggles {
        events.push(UserEvent::enabled(id));
        events.push(UserEvent::disabled(id));
    }
    events
}

fn bench_register_user(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("domain/register_user", |b| {
        b.iter(|| {
            rt.block_on(async {
                let service = service();
                let cmd = RegisterUser::with_generated_id("alice", "correct horse");
                service.register(cmd).await.unwrap();
            });
        });
    });
}

fn bench_toggle_enabled(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let service = service();
    let cmd = RegisterUser::with_generated_id("alice", "correct horse");
    let user_id = cmd.user_id;
    rt.block_on(async {
        service.register(cmd).await.unwrap();
        service.activate(ActivateUser::new(user_id)).await.unwrap();
    });

    c.bench_function("domain/enable_then_disable", |b| {
        b.iter(|| {
            rt.block_on(async {
                service.enable(EnableUser::new(user_id)).await.unwrap();
                service.disable(DisableUser::new(user_id)).await.unwrap();
            });
        });
    });
}

fn bench_reconstitute(c: &mut Criterion) {
    for toggles in [25, 50] {
        let id = AggregateId::generate();
        let events = history(id, toggles);
        let name = format!("domain/reconstitute_{}_events", events.len());

        c.bench_function(&name, |b| {
            b.iter_batched(
                || AggregateHistory::new(id, events.clone()).unwrap(),
                User::reconstitute_from,
                BatchSize::SmallInput,
            );
        });
    }
}

fn bench_load_from_store(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let service = service();
    let cmd = RegisterUser::with_generated_id("alice", "correct horse");
    let user_id = cmd.user_id;
    rt.block_on(async {
        service.register(cmd).await.unwrap();
        service.activate(ActivateUser::new(user_id)).await.unwrap();
        for _ in 0..50 {
            service.enable(EnableUser::new(user_id)).await.unwrap();
            service.disable(DisableUser::new(user_id)).await.unwrap();
        }
    });

    c.bench_function("domain/load_102_events", |b| {
        b.iter(|| {
            rt.block_on(async {
                service.get_user(user_id).await.unwrap().unwrap();
            });
        });
    });
}

fn bench_login_fingerprint(c: &mut Criterion) {
    let login = Login::new("alice@example.com").unwrap();

    c.bench_function("domain/login_fingerprint", |b| {
        b.iter(|| LoginFingerprint::of(&login));
    });
}

criterion_group!(
    benches,
    bench_register_user,
    bench_toggle_enabled,
    bench_reconstitute,
    bench_load_from_store,
    bench_login_fingerprint,
);
criterion_main!(benches);
