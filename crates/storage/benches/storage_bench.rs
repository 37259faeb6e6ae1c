use common::{CourierId, Money, OrderState, ProductId, StoreId};
use criterion::{Criterion, criterion_group, criterion_main};
use storage::{
    CustomerInfo, InMemoryOrderStore, NewLineItem, NewOrder, OrderFilter, OrderStoreExt,
    store::OrderStore,
};

const STORE: StoreId = StoreId::new(1);
const COURIER: CourierId = CourierId::new(7);

fn make_order() -> NewOrder {
    NewOrder {
        store_id: STORE,
        customer: CustomerInfo::new("Ana", "555-0101", "Calle 12 #3"),
        items: vec![
            NewLineItem {
                product_id: ProductId::new(10),
                product_name: "Empanada".to_string(),
                quantity: 2,
                unit_price: Money::from_cents(1000),
            },
            NewLineItem {
                product_id: ProductId::new(11),
                product_name: "Jugo".to_string(),
                quantity: 1,
                unit_price: Money::from_cents(300),
            },
        ],
    }
}

fn bench_insert_order(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("storage/insert_order", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = InMemoryOrderStore::new();
                store.insert(make_order()).await.unwrap();
            });
        });
    });
}

fn bench_insert_and_claim(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("storage/insert_and_claim", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = InMemoryOrderStore::new();
                let order = store.insert(make_order()).await.unwrap();
                store.claim(order.id, COURIER).await.unwrap().unwrap();
            });
        });
    });
}

fn bench_guarded_update(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("storage/guarded_state_update", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = InMemoryOrderStore::new();
                let order = store.insert(make_order()).await.unwrap();
                store
                    .update_state(
                        order.id,
                        OrderState::PendingDispatch,
                        OrderState::Fulfilled,
                        None,
                    )
                    .await
                    .unwrap()
                    .unwrap();
            });
        });
    });
}

fn bench_get_order(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryOrderStore::new();

    // Pre-populate with 100 orders, fetch one from the middle
    let target = rt.block_on(async {
        let mut target = None;
        for n in 0..100 {
            let order = store.insert(make_order()).await.unwrap();
            if n == 50 {
                target = Some(order.id);
            }
        }
        target.unwrap()
    });

    c.bench_function("storage/get_order_of_100", |b| {
        b.iter(|| {
            rt.block_on(async {
                store.get(target).await.unwrap().unwrap();
            });
        });
    });

    c.bench_function("storage/exists_via_ext", |b| {
        b.iter(|| {
            rt.block_on(async {
                assert!(store.exists(target).await.unwrap());
            });
        });
    });
}

fn bench_list_orders(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryOrderStore::new();

    // Pre-populate with 100 orders, every third one claimed
    rt.block_on(async {
        for n in 0..100 {
            let order = store.insert(make_order()).await.unwrap();
            if n % 3 == 0 {
                store.claim(order.id, COURIER).await.unwrap().unwrap();
            }
        }
    });

    c.bench_function("storage/list_100_orders", |b| {
        b.iter(|| {
            rt.block_on(async {
                store.list(STORE, &OrderFilter::new()).await.unwrap();
            });
        });
    });

    c.bench_function("storage/list_100_filtered", |b| {
        b.iter(|| {
            rt.block_on(async {
                store
                    .list(
                        STORE,
                        &OrderFilter::new()
                            .state(OrderState::Assigned)
                            .courier_id(COURIER),
                    )
                    .await
                    .unwrap();
            });
        });
    });
}

criterion_group!(
    benches,
    bench_insert_order,
    bench_insert_and_claim,
    bench_guarded_update,
    bench_get_order,
    bench_list_orders,
);
criterion_main!(benches);
