//! Parse tests for table elements
//!
//! Row and cell assembly, the implicit first row, header-cell marking,
//! attribute parsing on tables/rows/cells, inline `||` separators, and
//! recovery for table markers outside any table.

use wikitext::wikitext::ast::nodes::{Node, Table};
use wikitext::{parse, DiagnosticKind};

fn first_table(source: &str) -> Table {
    let result = parse(source);
    assert!(result.success());
    result
        .document
        .nodes
        .into_iter()
        .find_map(|node| match node {
            Node::Table(table) => Some(table),
            _ => None,
        })
        .expect("document contains a table")
}

fn cell_text(table: &Table, row: usize, cell: usize) -> String {
    table.rows[row].cells[cell]
        .children
        .iter()
        .filter_map(|n| n.as_text())
        .map(|t| t.content.trim())
        .collect::<Vec<_>>()
        .join(" ")
}

#[test]
fn test_rows_and_cells() {
    let table = first_table("{|\n|-\n| a || b\n|-\n| c || d\n|}");
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0].cells.len(), 2);
    assert_eq!(cell_text(&table, 0, 0), "a");
    assert_eq!(cell_text(&table, 0, 1), "b");
    assert_eq!(cell_text(&table, 1, 0), "c");
    assert_eq!(cell_text(&table, 1, 1), "d");
}

#[test]
fn test_cells_before_any_row_marker_open_an_implicit_row() {
    let table = first_table("{|\n| lonely\n|}");
    assert_eq!(table.rows.len(), 1);
    assert_eq!(cell_text(&table, 0, 0), "lonely");
}

#[test]
fn test_one_cell_per_leading_separator_line() {
    let table = first_table("{|\n| one\n| two\n|}");
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.rows[0].cells.len(), 2);
}

#[test]
fn test_header_cells_marked() {
    let table = first_table("{|\n! Name !! Age\n|-\n| Jane || 7\n|}");
    let header_row = &table.rows[0];
    assert!(header_row.cells.iter().all(|c| c.header));
    assert_eq!(cell_text(&table, 0, 0), "Name");

    let data_row = &table.rows[1];
    assert!(data_row.cells.iter().all(|c| !c.header));
}

#[test]
fn test_table_attributes() {
    let table = first_table("{| class=\"wikitable\" style=\"width: 50%\"\n| x\n|}");
    assert_eq!(table.attributes[0].name, "class");
    assert_eq!(table.attributes[0].value.as_deref(), Some("wikitable"));
    assert_eq!(table.attributes[1].name, "style");
}

#[test]
fn test_row_attributes() {
    let table = first_table("{|\n|- align=center\n| x\n|}");
    assert_eq!(table.rows[0].attributes[0].name, "align");
    assert_eq!(table.rows[0].attributes[0].value.as_deref(), Some("center"));
}

#[test]
fn test_cell_attributes_before_mid_line_pipe() {
    let table = first_table("{|\n| style=\"color:red\" | warning\n|}");
    let cell = &table.rows[0].cells[0];
    assert_eq!(cell.attributes[0].name, "style");
    assert_eq!(cell.attributes[0].value.as_deref(), Some("color:red"));
    assert_eq!(cell_text(&table, 0, 0), "warning");
}

#[test]
fn test_cells_may_hold_markup() {
    let table = first_table("{|\n| see [[Page]]\n| {{tmpl}}\n|}");
    let row = &table.rows[0];
    assert!(row.cells[0]
        .children
        .iter()
        .any(|n| matches!(n, Node::Link(_))));
    assert!(row.cells[1]
        .children
        .iter()
        .any(|n| matches!(n, Node::Template(_))));
}

#[test]
fn test_unterminated_cells_close_at_table_end() {
    let table = first_table("{|\n|-\n| open cell\n|}");
    assert_eq!(table.rows.len(), 1);
    assert_eq!(cell_text(&table, 0, 0), "open cell");
}

#[test]
fn test_unterminated_table_degrades_to_text() {
    let result = parse("{|\n| stuck\n");
    assert!(result.success());
    assert!(result
        .errors
        .iter()
        .any(|d| d.kind == DiagnosticKind::UnterminatedConstruct));
    assert!(result
        .document
        .nodes
        .iter()
        .all(|n| !matches!(n, Node::Table(_))));
}

#[test]
fn test_table_markers_outside_table_are_literal() {
    let result = parse("|- not a row\n");
    assert!(result.success());
    assert!(result
        .errors
        .iter()
        .any(|d| d.kind == DiagnosticKind::MalformedTable));
    match &result.document.nodes[0] {
        Node::Paragraph(paragraph) => {
            let text = paragraph.children[0].as_text().unwrap();
            assert!(text.content.starts_with("|-"));
        }
        other => panic!("expected paragraph, got {}", other.node_type()),
    }
}

#[test]
fn test_nested_table_inside_cell() {
    let table = first_table("{|\n| outer\n{|\n| inner\n|}\n|}");
    let outer_cell = &table.rows[0].cells[0];
    assert!(outer_cell
        .children
        .iter()
        .any(|n| matches!(n, Node::Table(_))));
}
