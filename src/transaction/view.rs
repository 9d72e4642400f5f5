//! Renders a caller's transactions as an HTML fragment for HTMX clients.

use maud::{Markup, html};

use crate::{
    endpoints::{self, format_endpoint},
    transaction::service::TransactionList,
};

const TABLE_STYLE: &str = "w-full text-sm text-left text-gray-500 dark:text-gray-400";
const TABLE_HEADER_STYLE: &str = "text-xs text-gray-700 uppercase \
    bg-gray-50 dark:bg-gray-700 dark:text-gray-400";
const TABLE_ROW_STYLE: &str = "bg-white border-b dark:bg-gray-800 dark:border-gray-700";
const TABLE_CELL_STYLE: &str = "px-6 py-4";
const BUTTON_DELETE_STYLE: &str = "text-red-600 hover:text-red-500 \
    dark:text-red-500 dark:hover:text-red-400 underline bg-transparent \
    border-none cursor-pointer";

/// The text shown when the caller has no transactions.
pub const NO_TRANSACTIONS_TEXT: &str = "No transactions";

/// Render `list` as a table with a row per transaction and a final sum row.
///
/// An empty list renders a short notice instead of an empty table.
pub fn transactions_fragment(list: &TransactionList) -> Markup {
    if list.transactions.is_empty() {
        return html! {
            p class="italic" { (NO_TRANSACTIONS_TEXT) }
        };
    }

    html! {
        table class=(TABLE_STYLE)
        {
            thead class=(TABLE_HEADER_STYLE)
            {
                tr
                {
                    th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                    th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Amount" }
                    th scope="col" class=(TABLE_CELL_STYLE) {}
                }
            }

            tbody
            {
                @for transaction in &list.transactions {
                    tr class=(TABLE_ROW_STYLE) data-transaction-id=(transaction.id)
                    {
                        td class=(TABLE_CELL_STYLE) { (transaction.description) }
                        td class={(TABLE_CELL_STYLE) " text-right"} { (transaction.amount) }
                        td class=(TABLE_CELL_STYLE)
                        {
                            button
                                hx-delete=(format_endpoint(endpoints::TRANSACTION_BY_ID, transaction.id))
                                hx-confirm="Are you sure you want to delete this transaction?"
                                hx-swap="none"
                                class=(BUTTON_DELETE_STYLE)
                            {
                                "Delete"
                            }
                        }
                    }
                }
            }

            tfoot
            {
                tr class="font-semibold text-gray-900 dark:text-white"
                {
                    th scope="row" class=(TABLE_CELL_STYLE) { "Sum" }
                    td class={(TABLE_CELL_STYLE) " text-right"} data-sum=(list.sum) { (list.sum) }
                    td class=(TABLE_CELL_STYLE) {}
                }
            }
        }
    }
}
