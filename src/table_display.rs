use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use combo_table::widgets::combo_table::ComboTable;
use combo_table::SearchModel;

/// Print the first `max_rows` rows of the controller's view
pub fn display_view<M: SearchModel>(combo: &ComboTable<M>, max_rows: usize, show_keys: bool) {
    let row_count = combo.row_count();
    if combo.is_loading() && row_count == 0 {
        println!("Filtering ...");
        return;
    }
    if row_count == 0 {
        println!("No matching rows.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let mut headers = vec![Cell::new("#").add_attribute(Attribute::Bold)];
    if show_keys {
        headers.push(Cell::new("key").add_attribute(Attribute::Bold));
    }
    headers.push(Cell::new("text").add_attribute(Attribute::Bold));
    table.set_header(headers);

    let selected = combo.selected_row_data().map(|r| r.row_id);
    for index in 0..row_count.min(max_rows) {
        let row = combo.model().get_row(index);
        let marker = if selected == Some(index) { ">" } else { "" };

        let mut cells = vec![Cell::new(format!("{}{}", marker, index))];
        match row {
            Some(row) => {
                if show_keys {
                    cells.push(Cell::new(row.key()));
                }
                let text = Cell::new(row.text());
                cells.push(if selected == Some(index) {
                    text.fg(Color::Yellow).add_attribute(Attribute::Bold)
                } else {
                    text
                });
            }
            None => {
                if show_keys {
                    cells.push(Cell::new(""));
                }
                cells.push(Cell::new("...").fg(Color::DarkGrey));
            }
        }
        table.add_row(cells);
    }

    println!("{table}");
    println!("{} rows", row_count);
}
