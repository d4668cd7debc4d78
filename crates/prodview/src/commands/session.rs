//! Interactive session: drives the screen view-models from stdin commands.
//!
//! One line per action; the affected screen is printed after each one.

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use prodview_core::{Catalog, ProductDetailView, ProductId, ProductListAltView, ProductListView};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::{products, show, util};

const HELP: &str = "\
commands:
  category <id>   filter the list by category (0 clears the filter)
  select <id>     show a product with its suppliers
  add             add the placeholder product locally
  refresh         reload products and categories from the server
  list            show the filtered list again
  added           show the list with local additions
  help            show this help
  quit            leave the session";

#[derive(Debug, PartialEq, Eq)]
enum SessionCommand {
    Category(String),
    Select(ProductId),
    Add,
    Refresh,
    List,
    Added,
    Help,
    Quit,
}

fn parse_line(line: &str) -> Result<Option<SessionCommand>, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let arg = words.next();

    let cmd = match (verb, arg) {
        ("category" | "c", arg) => SessionCommand::Category(arg.unwrap_or_default().to_owned()),
        ("select" | "s", Some(raw)) => raw
            .parse::<ProductId>()
            .map(SessionCommand::Select)
            .map_err(|_| format!("not a product id: {raw}"))?,
        ("select" | "s", None) => return Err("usage: select <id>".into()),
        ("add" | "a", _) => SessionCommand::Add,
        ("refresh" | "r", _) => SessionCommand::Refresh,
        ("list" | "l", _) => SessionCommand::List,
        ("added", _) => SessionCommand::Added,
        ("help" | "?", _) => SessionCommand::Help,
        ("quit" | "exit" | "q", _) => SessionCommand::Quit,
        (other, _) => return Err(format!("unknown command: {other} (try 'help')")),
    };
    Ok(Some(cmd))
}

struct Session<'a> {
    catalog: &'a Catalog,
    global: &'a GlobalOpts,
    color: bool,
    list: ProductListView,
    alt: ProductListAltView,
    detail: ProductDetailView,
}

impl Session<'_> {
    fn print(&self, text: &str) {
        output::print_output(text, self.global.quiet);
    }

    /// Print and dismiss any pending screen errors.
    fn flush_errors(&self) {
        let messages = [
            self.list.error_message().latest(),
            self.alt.error_message().latest(),
            self.detail.error_message().latest(),
        ];
        self.list.dismiss_error();
        self.alt.dismiss_error();
        self.detail.dismiss_error();

        // The same failure usually reaches every screen.
        let mut shown: Vec<String> = Vec::new();
        for text in messages.into_iter().flatten() {
            if !shown.contains(&text) {
                eprintln!("{}", output::error_line(&text, self.color));
                shown.push(text);
            }
        }
    }

    async fn show_list(&self) -> Result<(), CliError> {
        let filter = self.list.category_filter();
        let list = util::settle(self.catalog, &mut self.list.products(), |p| {
            p.as_ref()
                .is_some_and(|list| list.iter().all(|product| filter.matches(product)))
        })
        .await?;
        let list = list.map(|l| l.to_vec()).unwrap_or_default();
        self.print(&products::render(self.global, &list)?);
        Ok(())
    }

    async fn show_added(&self) -> Result<(), CliError> {
        let list = util::settle(self.catalog, &mut self.alt.products(), Option::is_some).await?;
        let list = list.map(|l| l.to_vec()).unwrap_or_default();
        self.print(&products::render(self.global, &list)?);
        Ok(())
    }

    async fn run_command(&self, cmd: SessionCommand) -> Result<(), CliError> {
        match cmd {
            SessionCommand::Category(raw) => {
                self.list.on_selected(&raw);
                self.show_list().await
            }
            SessionCommand::Select(id) => {
                let detail = show::load_detail(self.catalog, &self.detail, id).await?;
                let out = output::render_single(
                    &self.global.output,
                    &detail,
                    |d| show::detail_text(d, self.color),
                    |d| d.product.id.to_string(),
                )?;
                self.print(&out);
                Ok(())
            }
            SessionCommand::Add => {
                let mut stream = self.alt.products();
                let base = self
                    .catalog
                    .products_snapshot()
                    .ready()
                    .map_or(0, |list| list.len());
                let before = util::settle(self.catalog, &mut stream, |p| {
                    util::loaded_len(p.as_ref()).is_some_and(|n| n >= base)
                })
                .await?;
                let before = util::loaded_len(before.as_ref()).unwrap_or_default();
                self.alt.on_add();
                util::settle(self.catalog, &mut stream, |p| {
                    util::loaded_len(p.as_ref()).is_some_and(|n| n > before)
                })
                .await?;
                self.show_added().await
            }
            SessionCommand::Refresh => {
                let mut stream = self.list.products();
                self.catalog.refresh().await;
                util::next_change(self.catalog, &mut stream).await?;
                self.show_list().await
            }
            SessionCommand::List => self.show_list().await,
            SessionCommand::Added => self.show_added().await,
            SessionCommand::Help => {
                self.print(HELP);
                Ok(())
            }
            SessionCommand::Quit => Ok(()),
        }
    }
}

pub async fn handle(catalog: &Catalog, global: &GlobalOpts) -> Result<(), CliError> {
    let session = Session {
        catalog,
        global,
        color: output::should_color(&global.color),
        list: ProductListView::new(catalog),
        alt: ProductListAltView::new(catalog),
        detail: ProductDetailView::new(catalog),
    };

    // The first screen: every product, or the load error.
    session.show_list().await?;
    session.flush_errors();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let cmd = match parse_line(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(msg) => {
                eprintln!("{}", output::error_line(&msg, session.color));
                continue;
            }
        };
        if cmd == SessionCommand::Quit {
            break;
        }

        debug!(command = ?cmd, "session command");
        // Action failures are reported and the session continues.
        if let Err(err) = session.run_command(cmd).await {
            eprintln!("{:?}", miette::Report::new(err));
        }
        session.flush_errors();
    }

    Ok(())
}
