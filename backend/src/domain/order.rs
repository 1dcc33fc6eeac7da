//! Order and order line models.

use std::fmt;

use uuid::Uuid;

/// Validation errors returned by the order constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderValidationError {
    NoLines,
    ZeroQuantity,
    UnknownStatus,
    NegativeUnitPrice,
}

impl fmt::Display for OrderValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoLines => write!(f, "an order must contain at least one item"),
            Self::ZeroQuantity => write!(f, "item quantity must be at least 1"),
            Self::UnknownStatus => write!(
                f,
                "status must be one of 'pending', 'paid', 'shipped', or 'cancelled'",
            ),
            Self::NegativeUnitPrice => write!(f, "unit price must not be negative"),
        }
    }
}

impl std::error::Error for OrderValidationError {}

/// Lifecycle state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderStatus {
    /// Placed but not yet paid.
    #[default]
    Pending,
    /// Payment confirmed.
    Paid,
    /// Handed to the carrier.
    Shipped,
    /// Cancelled before fulfilment.
    Cancelled,
}

impl OrderStatus {
    /// Stable string form used in storage and JSON bodies.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Shipped => "shipped",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = OrderValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "shipped" => Ok(Self::Shipped),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(OrderValidationError::UnknownStatus),
        }
    }
}

/// One requested line of a new order: which product, and how many.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLine {
    product_id: Uuid,
    quantity: i32,
}

impl OrderLine {
    /// Validate and construct a line request.
    pub fn new(product_id: Uuid, quantity: i32) -> Result<Self, OrderValidationError> {
        if quantity < 1 {
            return Err(OrderValidationError::ZeroQuantity);
        }
        Ok(Self {
            product_id,
            quantity,
        })
    }

    pub fn product_id(&self) -> Uuid {
        self.product_id
    }

    pub fn quantity(&self) -> i32 {
        self.quantity
    }
}

/// Validate a whole basket of requested lines.
pub fn validate_lines(lines: &[(Uuid, i32)]) -> Result<Vec<OrderLine>, OrderValidationError> {
    if lines.is_empty() {
        return Err(OrderValidationError::NoLines);
    }
    lines
        .iter()
        .map(|&(product_id, quantity)| OrderLine::new(product_id, quantity))
        .collect()
}

/// Persisted order line with the unit price captured at purchase time.
///
/// The captured price keeps historical orders stable when the catalogue price
/// changes later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    id: Uuid,
    order_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    unit_price_cents: i64,
}

impl OrderItem {
    /// Construct a persisted order item.
    pub fn new(
        id: Uuid,
        order_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        unit_price_cents: i64,
    ) -> Result<Self, OrderValidationError> {
        if quantity < 1 {
            return Err(OrderValidationError::ZeroQuantity);
        }
        if unit_price_cents < 0 {
            return Err(OrderValidationError::NegativeUnitPrice);
        }
        Ok(Self {
            id,
            order_id,
            product_id,
            quantity,
            unit_price_cents,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn order_id(&self) -> Uuid {
        self.order_id
    }

    pub fn product_id(&self) -> Uuid {
        self.product_id
    }

    pub fn quantity(&self) -> i32 {
        self.quantity
    }

    /// Unit price in minor currency units at the time of purchase.
    pub fn unit_price_cents(&self) -> i64 {
        self.unit_price_cents
    }

    /// Line total in minor currency units.
    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents * i64::from(self.quantity)
    }
}

/// Placed order with its line items.
///
/// ## Invariants
/// - `total_cents` equals the sum of line totals at creation time; the
///   repository computes it inside the placement transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    id: Uuid,
    user_id: Uuid,
    status: OrderStatus,
    total_cents: i64,
    items: Vec<OrderItem>,
}

impl Order {
    /// Construct an order from persisted parts.
    pub fn new(
        id: Uuid,
        user_id: Uuid,
        status: OrderStatus,
        total_cents: i64,
        items: Vec<OrderItem>,
    ) -> Self {
        Self {
            id,
            user_id,
            status,
            total_cents,
            items,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Identifier of the account that placed the order.
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Order total in minor currency units.
    pub fn total_cents(&self) -> i64 {
        self.total_cents
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }
}
