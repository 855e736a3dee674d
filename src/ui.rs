// ===============================
// src/ui.rs
// ===============================
//
// Terminal adapter. Translates stdin lines into UiEvents and prints the
// Notices coming back. No pricing or cart logic lives here; this module is
// the stand-in for whatever surface renders the menu.
//

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::domain::{fmt_money, Notice, UiEvent};

const HELP: &str = "\
commands:
  menu
  show <product>
  toggle <product> <param> <option>
  amount <product> <n>
  more <product> | less <product>
  add <product>
  cart
  remove <line-id>
  lineamount <line-id> <n>
  checkout <phone> <address...>
  quit";

pub fn parse_line(line: &str) -> Result<UiEvent, String> {
    let mut words = line.split_whitespace();
    let cmd = words.next().unwrap_or("").to_ascii_lowercase();
    let rest: Vec<&str> = words.collect();

    let usage = |u: &str| Err(format!("usage: {u}"));

    match cmd.as_str() {
        "menu" => Ok(UiEvent::ShowMenu),
        "show" => match rest.as_slice() {
            [product] => Ok(UiEvent::ShowItem { product: product.to_string() }),
            _ => usage("show <product>"),
        },
        "toggle" => match rest.as_slice() {
            [product, param, option] => Ok(UiEvent::ToggleOption {
                product: product.to_string(),
                param: param.to_string(),
                option: option.to_string(),
            }),
            _ => usage("toggle <product> <param> <option>"),
        },
        "amount" => match rest.as_slice() {
            [product, raw] => Ok(UiEvent::SetAmount {
                product: product.to_string(),
                raw: raw.to_string(),
            }),
            _ => usage("amount <product> <n>"),
        },
        "more" => match rest.as_slice() {
            [product] => Ok(UiEvent::Increment { product: product.to_string() }),
            _ => usage("more <product>"),
        },
        "less" => match rest.as_slice() {
            [product] => Ok(UiEvent::Decrement { product: product.to_string() }),
            _ => usage("less <product>"),
        },
        "add" => match rest.as_slice() {
            [product] => Ok(UiEvent::AddToCart { product: product.to_string() }),
            _ => usage("add <product>"),
        },
        "cart" => Ok(UiEvent::ShowCart),
        "remove" => match rest.as_slice() {
            [line_id] => Ok(UiEvent::RemoveLine { line_id: line_id.to_string() }),
            _ => usage("remove <line-id>"),
        },
        "lineamount" => match rest.as_slice() {
            [line_id, raw] => Ok(UiEvent::SetLineAmount {
                line_id: line_id.to_string(),
                raw: raw.to_string(),
            }),
            _ => usage("lineamount <line-id> <n>"),
        },
        "checkout" => match rest.as_slice() {
            [phone, address @ ..] if !address.is_empty() => Ok(UiEvent::Checkout {
                phone: phone.to_string(),
                address: address.join(" "),
            }),
            _ => usage("checkout <phone> <address...>"),
        },
        "quit" | "exit" => Ok(UiEvent::Quit),
        "help" => Err(HELP.to_string()),
        other => Err(format!("unknown command '{other}', try 'help'")),
    }
}

fn print_notice(n: &Notice) {
    match n {
        Notice::Menu(rows) => {
            println!("menu:");
            for r in rows {
                println!("  {:<12} {:<24} {}", r.id, r.name, fmt_money(r.price));
            }
        }
        Notice::ItemQuote { product, name, quote } => {
            println!(
                "{name} [{product}]  unit {}  line {}",
                fmt_money(quote.price_single),
                fmt_money(quote.price)
            );
            for ind in &quote.indicators {
                let mark = if ind.selected { "x" } else { " " };
                println!("  [{mark}] {}/{}", ind.param, ind.option);
            }
        }
        Notice::Cart(snapshot) => {
            println!("cart ({} lines):", snapshot.lines.len());
            for l in &snapshot.lines {
                println!(
                    "  {}  {} x{}  unit {}  line {}",
                    l.line_id,
                    l.name,
                    l.amount,
                    fmt_money(l.price_single),
                    fmt_money(l.price)
                );
            }
            let t = &snapshot.totals;
            println!(
                "  items {}  subtotal {}  delivery {}  total {}",
                t.total_number,
                fmt_money(t.subtotal),
                fmt_money(t.delivery_fee),
                fmt_money(t.total)
            );
        }
        Notice::LineAmount { line_id, amount, price } => {
            println!("line {line_id}  amount {amount}  price {}", fmt_money(*price));
        }
        Notice::OrderAccepted { total } => println!("order accepted, total {}", fmt_money(*total)),
        Notice::OrderFailed { reason } => println!("order failed: {reason}"),
        Notice::Unknown(what) => println!("unknown: {what}"),
    }
}

/// Interactive loop: one select over stdin lines and incoming notices.
pub async fn run_repl(ui_tx: mpsc::Sender<UiEvent>, mut notice_rx: mpsc::Receiver<Notice>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("type 'help' for commands");

    loop {
        tokio::select! {
            maybe_line = lines.next_line() => {
                match maybe_line {
                    Ok(Some(line)) => {
                        let trimmed = line.trim();
                        if trimmed.is_empty() {
                            continue;
                        }
                        match parse_line(trimmed) {
                            Ok(UiEvent::Quit) => {
                                let _ = ui_tx.send(UiEvent::Quit).await;
                                break;
                            }
                            Ok(ev) => {
                                let _ = ui_tx.send(ev).await;
                            }
                            Err(msg) => println!("{msg}"),
                        }
                    }
                    Ok(None) => {
                        // stdin closed
                        let _ = ui_tx.send(UiEvent::Quit).await;
                        break;
                    }
                    Err(e) => {
                        error!(?e, "stdin read error");
                        let _ = ui_tx.send(UiEvent::Quit).await;
                        break;
                    }
                }
            }
            Some(n) = notice_rx.recv() => print_notice(&n),
        }
    }
}

/// Scripted walk through the whole flow against the mock menu: configure a
/// product, add two lines, show the cart, submit an order, quit.
pub fn demo_script() -> Vec<UiEvent> {
    vec![
        UiEvent::ShowMenu,
        UiEvent::ShowItem { product: "pizza".to_string() },
        UiEvent::ToggleOption {
            product: "pizza".to_string(),
            param: "toppings".to_string(),
            option: "mushrooms".to_string(),
        },
        UiEvent::SetAmount { product: "pizza".to_string(), raw: "3".to_string() },
        UiEvent::AddToCart { product: "pizza".to_string() },
        UiEvent::ToggleOption {
            product: "salad".to_string(),
            param: "ingredients".to_string(),
            option: "feta".to_string(),
        },
        UiEvent::AddToCart { product: "salad".to_string() },
        UiEvent::ShowCart,
        UiEvent::Checkout {
            phone: "600-100-200".to_string(),
            address: "12 Dough Street".to_string(),
        },
        UiEvent::Quit,
    ]
}

pub async fn run_demo(ui_tx: mpsc::Sender<UiEvent>, mut notice_rx: mpsc::Receiver<Notice>) {
    info!("demo mode");
    for ev in demo_script() {
        let _ = ui_tx.send(ev).await;
    }
    // The session drops its notice sender on Quit; drain until then.
    while let Some(n) = notice_rx.recv().await {
        print_notice(&n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_toggle_and_checkout() {
        match parse_line("toggle pizza toppings olives").unwrap() {
            UiEvent::ToggleOption { product, param, option } => {
                assert_eq!(product, "pizza");
                assert_eq!(param, "toppings");
                assert_eq!(option, "olives");
            }
            other => panic!("unexpected event: {other:?}"),
        }
        match parse_line("checkout 600-100-200 12 Dough Street").unwrap() {
            UiEvent::Checkout { phone, address } => {
                assert_eq!(phone, "600-100-200");
                assert_eq!(address, "12 Dough Street");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_commands_with_usage() {
        assert!(parse_line("toggle pizza").is_err());
        assert!(parse_line("checkout 600").is_err());
        assert!(parse_line("frobnicate").is_err());
    }

    #[test]
    fn quit_and_aliases_parse() {
        assert!(matches!(parse_line("quit").unwrap(), UiEvent::Quit));
        assert!(matches!(parse_line("exit").unwrap(), UiEvent::Quit));
        assert!(matches!(parse_line("cart").unwrap(), UiEvent::ShowCart));
    }

    #[test]
    fn demo_script_ends_with_quit() {
        let script = demo_script();
        assert!(matches!(script.last(), Some(UiEvent::Quit)));
    }
}
