// ===============================
// src/session.rs
// ===============================
//
// The event dispatcher. Consumes UiEvents from the adapter, owns the menu
// items and the cart, and publishes consistent cart snapshots on a watch
// channel. All state transitions for one event run synchronously before the
// next event is taken, so every observer reads totals that match the lines.
//

use ahash::AHashMap as HashMap;
use chrono::Utc;
use rand::Rng;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};

use crate::cart::Cart;
use crate::checkout;
use crate::config::Limits;
use crate::domain::{CartSnapshot, Event, MenuRow, Notice, ProductDef, UiEvent};
use crate::metrics::{
    CART_ADDS, CART_LINES, CART_REMOVES, CART_SUBTOTAL, CART_TOTAL_NUMBER, ORDERS_FAILED,
    ORDERS_SUBMITTED,
};
use crate::pricing::MenuItem;

fn mint_line_id() -> String {
    let now: i128 = Utc::now().timestamp_nanos_opt().unwrap_or(0) as i128;
    format!("LN-{}-{}", now, rand::thread_rng().gen::<u32>())
}

pub async fn run(
    mut ui_rx: mpsc::Receiver<UiEvent>,
    notice_tx: mpsc::Sender<Notice>,
    snap_tx: watch::Sender<CartSnapshot>,
    rec_tx: mpsc::Sender<Event>,
    products: Vec<ProductDef>,
    orders_url: String,
    limits: Limits,
) {
    // Menu keeps catalog order; the index map is only for lookup.
    let mut menu: Vec<MenuItem> = products
        .into_iter()
        .map(|def| MenuItem::new(def, limits.amount))
        .collect();
    let index: HashMap<String, usize> = menu
        .iter()
        .enumerate()
        .map(|(i, item)| (item.def.id.clone(), i))
        .collect();

    let mut cart = Cart::new(limits.delivery_fee, limits.amount);
    let http = reqwest::Client::new();

    info!(products = menu.len(), "session started");

    while let Some(ev) = ui_rx.recv().await {
        match ev {
            UiEvent::ShowMenu => {
                let rows = menu
                    .iter()
                    .map(|item| MenuRow {
                        id: item.def.id.clone(),
                        name: item.def.name.clone(),
                        price: item.def.price,
                    })
                    .collect();
                let _ = notice_tx.send(Notice::Menu(rows)).await;
            }

            UiEvent::ShowItem { product } => match index.get(&product) {
                Some(&i) => announce_quote(&menu[i], &notice_tx, &rec_tx).await,
                None => {
                    let _ = notice_tx.send(Notice::Unknown(product)).await;
                }
            },

            UiEvent::ToggleOption { product, param, option } => match index.get(&product) {
                Some(&i) => {
                    let item = &mut menu[i];
                    match item.toggle_option(&param, &option) {
                        Some(on) => {
                            debug!(%product, %param, %option, on, "option toggled");
                            announce_quote(item, &notice_tx, &rec_tx).await;
                        }
                        None => {
                            let _ = notice_tx
                                .send(Notice::Unknown(format!("{product} {param}/{option}")))
                                .await;
                        }
                    }
                }
                None => {
                    let _ = notice_tx.send(Notice::Unknown(product)).await;
                }
            },

            UiEvent::SetAmount { product, raw } => match index.get(&product) {
                Some(&i) => {
                    let item = &mut menu[i];
                    item.amount.set_value(&raw);
                    announce_quote(item, &notice_tx, &rec_tx).await;
                }
                None => {
                    let _ = notice_tx.send(Notice::Unknown(product)).await;
                }
            },

            UiEvent::Increment { product } => match index.get(&product) {
                Some(&i) => {
                    let item = &mut menu[i];
                    item.amount.increment();
                    announce_quote(item, &notice_tx, &rec_tx).await;
                }
                None => {
                    let _ = notice_tx.send(Notice::Unknown(product)).await;
                }
            },

            UiEvent::Decrement { product } => match index.get(&product) {
                Some(&i) => {
                    let item = &mut menu[i];
                    item.amount.decrement();
                    announce_quote(item, &notice_tx, &rec_tx).await;
                }
                None => {
                    let _ = notice_tx.send(Notice::Unknown(product)).await;
                }
            },

            UiEvent::AddToCart { product } => match index.get(&product) {
                Some(&i) => {
                    let line = menu[i].to_cart_line(mint_line_id());
                    info!(line_id = %line.line_id, product = %line.id, amount = line.amount, "line added");
                    let _ = rec_tx.send(Event::LineAdded(line.clone())).await;
                    cart.add(line);
                    CART_ADDS.inc();
                    publish(&cart, &snap_tx, &notice_tx, &rec_tx).await;
                }
                None => {
                    let _ = notice_tx.send(Notice::Unknown(product)).await;
                }
            },

            UiEvent::ShowCart => {
                let _ = notice_tx.send(Notice::Cart(cart.snapshot())).await;
            }

            UiEvent::RemoveLine { line_id } => {
                if cart.remove(&line_id) {
                    CART_REMOVES.inc();
                    let _ = rec_tx.send(Event::LineRemoved { line_id }).await;
                } else {
                    // Unknown line ids are a silent no-op.
                    debug!(%line_id, "remove for unknown line");
                }
                publish(&cart, &snap_tx, &notice_tx, &rec_tx).await;
            }

            UiEvent::SetLineAmount { line_id, raw } => {
                match cart.set_line_amount(&line_id, &raw) {
                    Some((amount, price)) => {
                        let _ = rec_tx
                            .send(Event::LineAmount { line_id: line_id.clone(), amount, price })
                            .await;
                        let _ = notice_tx
                            .send(Notice::LineAmount { line_id, amount, price })
                            .await;
                    }
                    None => debug!(%line_id, "amount edit for unknown line"),
                }
                publish(&cart, &snap_tx, &notice_tx, &rec_tx).await;
            }

            UiEvent::Checkout { phone, address } => {
                let payload = checkout::build_payload(&cart.snapshot(), &phone, &address);
                match checkout::submit(&http, &orders_url, &payload).await {
                    Ok(()) => {
                        ORDERS_SUBMITTED.inc();
                        let _ = rec_tx
                            .send(Event::OrderSent {
                                total: payload.total_price,
                                total_number: payload.total_number,
                            })
                            .await;
                        let _ = notice_tx
                            .send(Notice::OrderAccepted { total: payload.total_price })
                            .await;
                    }
                    Err(e) => {
                        ORDERS_FAILED.inc();
                        error!(%e, "order submission failed");
                        let _ = rec_tx.send(Event::OrderFailed { reason: e.to_string() }).await;
                        let _ = notice_tx.send(Notice::OrderFailed { reason: e.to_string() }).await;
                    }
                }
            }

            UiEvent::Quit => {
                info!("session quit");
                break;
            }
        }
    }

    info!("session stopped");
}

async fn announce_quote(
    item: &MenuItem,
    notice_tx: &mpsc::Sender<Notice>,
    rec_tx: &mpsc::Sender<Event>,
) {
    let quote = item.quote();
    let _ = rec_tx
        .send(Event::Quoted {
            product: item.def.id.clone(),
            price_single: quote.price_single,
            price: quote.price,
        })
        .await;
    let _ = notice_tx
        .send(Notice::ItemQuote {
            product: item.def.id.clone(),
            name: item.def.name.clone(),
            quote,
        })
        .await;
}

/// Push the current cart everywhere that observes it: gauges, the watch
/// snapshot, the UI notice stream and the recorder.
async fn publish(
    cart: &Cart,
    snap_tx: &watch::Sender<CartSnapshot>,
    notice_tx: &mpsc::Sender<Notice>,
    rec_tx: &mpsc::Sender<Event>,
) {
    let snapshot = cart.snapshot();
    CART_LINES.set(cart.len() as i64);
    CART_TOTAL_NUMBER.set(snapshot.totals.total_number);
    CART_SUBTOTAL.set(snapshot.totals.subtotal);
    let _ = rec_tx.send(Event::Totals(snapshot.totals.clone())).await;
    let _ = snap_tx.send(snapshot.clone());
    let _ = notice_tx.send(Notice::Cart(snapshot)).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::AmountBounds;
    use crate::domain::{OptionDef, ParamDef};
    use std::collections::HashMap as StdHashMap;

    fn fixture_products() -> Vec<ProductDef> {
        let mut options = StdHashMap::new();
        options.insert(
            "extraCheese".to_string(),
            OptionDef { label: "Extra cheese".to_string(), price: 500, default: false },
        );
        let mut params = StdHashMap::new();
        params.insert(
            "toppings".to_string(),
            ParamDef { label: "Toppings".to_string(), options },
        );
        vec![
            ProductDef {
                id: "pizza".to_string(),
                name: "Pizza".to_string(),
                price: 2_000,
                params,
            },
            ProductDef {
                id: "lemonade".to_string(),
                name: "Lemonade".to_string(),
                price: 500,
                params: StdHashMap::new(),
            },
        ]
    }

    fn limits() -> Limits {
        Limits { delivery_fee: 2_000, amount: AmountBounds::default() }
    }

    struct Harness {
        ui_tx: mpsc::Sender<UiEvent>,
        notice_rx: mpsc::Receiver<Notice>,
        snap_rx: watch::Receiver<CartSnapshot>,
        handle: tokio::task::JoinHandle<()>,
    }

    fn spawn_session() -> Harness {
        let (ui_tx, ui_rx) = mpsc::channel(64);
        let (notice_tx, notice_rx) = mpsc::channel(256);
        let (snap_tx, snap_rx) = watch::channel(CartSnapshot::default());
        let (rec_tx, mut rec_rx) = mpsc::channel(256);
        tokio::spawn(async move { while rec_rx.recv().await.is_some() {} });
        let handle = tokio::spawn(run(
            ui_rx,
            notice_tx,
            snap_tx,
            rec_tx,
            fixture_products(),
            "http://localhost:3131/orders".to_string(),
            limits(),
        ));
        Harness { ui_tx, notice_rx, snap_rx, handle }
    }

    async fn next_cart(h: &mut Harness) -> CartSnapshot {
        loop {
            match h.notice_rx.recv().await {
                Some(Notice::Cart(snapshot)) => return snapshot,
                Some(_) => continue,
                None => panic!("notice channel closed before a cart arrived"),
            }
        }
    }

    #[tokio::test]
    async fn configured_product_flows_into_totals() {
        let mut h = spawn_session();
        h.ui_tx
            .send(UiEvent::ToggleOption {
                product: "pizza".to_string(),
                param: "toppings".to_string(),
                option: "extraCheese".to_string(),
            })
            .await
            .unwrap();
        h.ui_tx
            .send(UiEvent::SetAmount { product: "pizza".to_string(), raw: "3".to_string() })
            .await
            .unwrap();
        h.ui_tx.send(UiEvent::AddToCart { product: "pizza".to_string() }).await.unwrap();

        let snapshot = next_cart(&mut h).await;
        assert_eq!(snapshot.lines.len(), 1);
        assert_eq!(snapshot.lines[0].price_single, 2_500);
        assert_eq!(snapshot.lines[0].price, 7_500);
        assert_eq!(snapshot.totals.subtotal, 7_500);
        assert_eq!(snapshot.totals.delivery_fee, 2_000);
        assert_eq!(snapshot.totals.total, 9_500);

        h.ui_tx.send(UiEvent::Quit).await.unwrap();
        h.handle.await.unwrap();
    }

    #[tokio::test]
    async fn untouched_product_keeps_base_price_and_default_amount() {
        let mut h = spawn_session();
        h.ui_tx.send(UiEvent::AddToCart { product: "pizza".to_string() }).await.unwrap();

        let snapshot = next_cart(&mut h).await;
        assert_eq!(snapshot.lines[0].price_single, 2_000);
        assert_eq!(snapshot.lines[0].amount, 1);
        assert_eq!(snapshot.lines[0].price, 2_000);
        assert_eq!(snapshot.totals.total, 4_000);

        h.ui_tx.send(UiEvent::Quit).await.unwrap();
        h.handle.await.unwrap();
    }

    #[tokio::test]
    async fn removing_first_of_two_lines_leaves_the_second_alone() {
        let mut h = spawn_session();
        h.ui_tx.send(UiEvent::AddToCart { product: "pizza".to_string() }).await.unwrap();
        let first = next_cart(&mut h).await;
        let first_id = first.lines[0].line_id.clone();

        h.ui_tx.send(UiEvent::AddToCart { product: "lemonade".to_string() }).await.unwrap();
        let both = next_cart(&mut h).await;
        assert_eq!(both.lines.len(), 2);

        h.ui_tx.send(UiEvent::RemoveLine { line_id: first_id }).await.unwrap();
        let after = next_cart(&mut h).await;
        assert_eq!(after.lines.len(), 1);
        assert_eq!(after.lines[0].id, "lemonade");
        assert_eq!(after.totals.subtotal, 500);
        assert_eq!(after.totals.total, 2_500);
        assert_eq!(after.totals.total_number, 1);

        h.ui_tx.send(UiEvent::Quit).await.unwrap();
        h.handle.await.unwrap();
    }

    #[tokio::test]
    async fn watch_snapshot_matches_last_published_totals() {
        let mut h = spawn_session();
        h.ui_tx.send(UiEvent::AddToCart { product: "lemonade".to_string() }).await.unwrap();
        let _ = next_cart(&mut h).await;
        h.ui_tx.send(UiEvent::Quit).await.unwrap();
        h.handle.await.unwrap();

        let snapshot = h.snap_rx.borrow();
        assert_eq!(snapshot.totals.subtotal, 500);
        assert_eq!(snapshot.totals.total, 2_500);
    }

    #[tokio::test]
    async fn line_amount_edit_republishes_totals() {
        let mut h = spawn_session();
        h.ui_tx.send(UiEvent::AddToCart { product: "pizza".to_string() }).await.unwrap();
        let snapshot = next_cart(&mut h).await;
        let line_id = snapshot.lines[0].line_id.clone();

        h.ui_tx
            .send(UiEvent::SetLineAmount { line_id, raw: "4".to_string() })
            .await
            .unwrap();
        let after = next_cart(&mut h).await;
        assert_eq!(after.lines[0].amount, 4);
        assert_eq!(after.lines[0].price, 8_000);
        assert_eq!(after.totals.subtotal, 8_000);
        assert_eq!(after.totals.total, 10_000);

        h.ui_tx.send(UiEvent::Quit).await.unwrap();
        h.handle.await.unwrap();
    }

    #[tokio::test]
    async fn removing_unknown_line_keeps_cart_unchanged() {
        let mut h = spawn_session();
        h.ui_tx.send(UiEvent::AddToCart { product: "pizza".to_string() }).await.unwrap();
        let before = next_cart(&mut h).await;

        h.ui_tx
            .send(UiEvent::RemoveLine { line_id: "LN-nope".to_string() })
            .await
            .unwrap();
        let after = next_cart(&mut h).await;
        assert_eq!(after.lines.len(), before.lines.len());
        assert_eq!(after.totals.total, before.totals.total);

        h.ui_tx.send(UiEvent::Quit).await.unwrap();
        h.handle.await.unwrap();
    }
}
