use contracts::history::{SalesSummary, SettlementKind, SettlementRecord};
use contracts::marketplace::PurchaseReceipt;
use serde::{Deserialize, Serialize};
use contracts::events::MarketEvent;
use types::amount::{as_string, to_units, Amount, NATIVE_DECIMALS};
use types::book::{Book, Listing};
use types::ids::{Address, BookId};

pub const DEFAULT_PAGE_LIMIT: usize = 20;
pub const MAX_PAGE_LIMIT: usize = 100;

#[derive(Debug, Clone, Deserialize)]
pub struct ListBookRequest {
    pub title: String,
    pub content_reference: String,
    #[serde(with = "as_string")]
    pub price: Amount,
    pub royalty_percentage: u8,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover_reference: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl From<ListBookRequest> for Listing {
    fn from(req: ListBookRequest) -> Self {
        Listing {
            title: req.title,
            content_reference: req.content_reference,
            price: req.price,
            royalty_percentage: req.royalty_percentage,
            description: req.description,
            cover_reference: req.cover_reference,
            categories: req.categories,
            tags: req.tags,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListBookResponse {
    pub book_id: BookId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseRequest {
    #[serde(with = "as_string")]
    pub payment: Amount,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePriceRequest {
    #[serde(with = "as_string")]
    pub price: Amount,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransferOwnershipRequest {
    pub new_owner: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

impl PageQuery {
    pub fn offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }

    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_PAGE_LIMIT).min(MAX_PAGE_LIMIT)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BookResponse {
    pub id: BookId,
    pub title: String,
    pub content_reference: String,
    pub description: Option<String>,
    pub cover_reference: Option<String>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    #[serde(with = "as_string")]
    pub price: Amount,
    /// Price in whole native units, for display
    pub price_display: Option<String>,
    pub royalty_percentage: u8,
    pub author: Address,
    pub is_available: bool,
    pub total_sales: u64,
    pub created_at: i64,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            price_display: to_units(book.price, NATIVE_DECIMALS)
                .ok()
                .map(|d| d.to_string()),
            title: book.title,
            content_reference: book.content_reference,
            description: book.description,
            cover_reference: book.cover_reference,
            categories: book.categories,
            tags: book.tags,
            price: book.price,
            royalty_percentage: book.royalty_percentage,
            author: book.author,
            is_available: book.is_available,
            total_sales: book.total_sales,
            created_at: book.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PurchaseResponse {
    pub book_id: BookId,
    pub buyer: Address,
    pub author: Address,
    #[serde(with = "as_string")]
    pub payment: Amount,
    #[serde(with = "as_string")]
    pub platform_fee: Amount,
    #[serde(with = "as_string")]
    pub royalty: Amount,
    #[serde(with = "as_string")]
    pub author_payout: Amount,
    #[serde(with = "as_string")]
    pub refund: Amount,
}

impl From<PurchaseReceipt> for PurchaseResponse {
    fn from(receipt: PurchaseReceipt) -> Self {
        Self {
            book_id: receipt.book_id,
            buyer: receipt.buyer,
            author: receipt.author,
            payment: receipt.payment,
            platform_fee: receipt.split.platform_fee,
            royalty: receipt.split.royalty,
            author_payout: receipt.split.author_payout,
            refund: receipt.refund,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RemoveBookResponse {
    pub book_id: BookId,
    /// False when the book was already removed
    pub removed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContentResponse {
    pub book_id: BookId,
    pub content_reference: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HasPurchasedResponse {
    pub book_id: BookId,
    pub buyer: Address,
    pub purchased: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorBooksResponse {
    pub author: Address,
    pub count: usize,
    pub book_ids: Vec<BookId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AmountResponse {
    pub address: Address,
    #[serde(with = "as_string")]
    pub amount: Amount,
}

#[derive(Debug, Clone, Serialize)]
pub struct SalesResponse {
    pub book_id: BookId,
    pub total_sales: u64,
    #[serde(with = "as_string")]
    pub total_revenue: Amount,
    #[serde(with = "as_string")]
    pub total_royalties: Amount,
    #[serde(with = "as_string")]
    pub total_platform_fees: Amount,
}

impl SalesResponse {
    pub fn new(book_id: BookId, summary: SalesSummary) -> Self {
        Self {
            book_id,
            total_sales: summary.total_sales,
            total_revenue: summary.total_revenue,
            total_royalties: summary.total_royalties,
            total_platform_fees: summary.total_platform_fees,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SettlementResponse {
    pub sequence: u64,
    pub kind: SettlementKind,
    pub book_id: Option<BookId>,
    pub payer: Address,
    pub payee: Address,
    #[serde(with = "as_string")]
    pub amount: Amount,
    pub timestamp: i64,
}

impl From<SettlementRecord> for SettlementResponse {
    fn from(record: SettlementRecord) -> Self {
        Self {
            sequence: record.sequence,
            kind: record.kind,
            book_id: record.book_id,
            payer: record.payer,
            payee: record.payee,
            amount: record.amount,
            timestamp: record.timestamp,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MarketStatusResponse {
    pub owner: Address,
    pub paused: bool,
    #[serde(with = "as_string")]
    pub retained: Amount,
    #[serde(with = "as_string")]
    pub outstanding_royalties: Amount,
    #[serde(with = "as_string")]
    pub platform_fees: Amount,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventPageResponse {
    /// Events pending in the log, across all pages
    pub total: usize,
    pub offset: usize,
    pub events: Vec<MarketEvent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DrainedEventsResponse {
    pub drained: usize,
    pub events: Vec<MarketEvent>,
}
