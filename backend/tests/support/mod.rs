//! Shared in-memory stubs and app builders for endpoint tests.
//!
//! Every domain port gets a hand-rolled stub so handler behaviour can be
//! exercised end-to-end without PostgreSQL. The stubs honour the port
//! contracts (duplicate detection, stock checks, rollback on failure) so the
//! tests observe the same status codes the real adapters would produce.

#![allow(dead_code, reason = "each test binary uses a subset of the helpers")]

use std::sync::{Arc, Mutex, MutexGuard};

use actix_http::Request;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App};
use async_trait::async_trait;
use uuid::Uuid;

use backend::domain::ports::{
    NewOrderItem, NewUser, OrderItemChanges, OrderItemPersistenceError, OrderItemRepository,
    OrderPersistenceError, OrderRepository, PasswordHasher, PasswordHasherError,
    ProductPersistenceError, ProductRepository, TokenService, TokenServiceError, TokenSubject,
    UserChanges, UserPersistenceError, UserRepository,
};
use backend::domain::{
    EmailAddress, Order, OrderItem, OrderLine, OrderStatus, PasswordHash, Product, ProductDraft,
    ProductDraftParts, Role, User,
};
use backend::inbound::http::{configure_api, HttpState};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().expect("stub lock poisoned")
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemoryUsers {
    rows: Mutex<Vec<User>>,
}

impl InMemoryUsers {
    pub fn contains(&self, id: Uuid) -> bool {
        lock(&self.rows).iter().any(|user| user.id() == id)
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn create(&self, new_user: NewUser) -> Result<User, UserPersistenceError> {
        let mut rows = lock(&self.rows);
        if rows.iter().any(|u| u.email() == &new_user.email) {
            return Err(UserPersistenceError::duplicate("email"));
        }
        if rows.iter().any(|u| u.username() == &new_user.username) {
            return Err(UserPersistenceError::duplicate("username"));
        }
        let user = User::new(
            Uuid::new_v4(),
            new_user.username,
            new_user.email,
            new_user.password_hash,
            new_user.role,
        );
        rows.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserPersistenceError> {
        Ok(lock(&self.rows).iter().find(|u| u.id() == id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(lock(&self.rows).iter().find(|u| u.email() == email).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        Ok(lock(&self.rows).clone())
    }

    async fn update(
        &self,
        id: Uuid,
        changes: UserChanges,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut rows = lock(&self.rows);
        let Some(index) = rows.iter().position(|u| u.id() == id) else {
            return Ok(None);
        };
        let current = &rows[index];
        let updated = User::new(
            current.id(),
            changes.username.unwrap_or_else(|| current.username().clone()),
            changes.email.unwrap_or_else(|| current.email().clone()),
            changes
                .password_hash
                .unwrap_or_else(|| current.password_hash().clone()),
            changes.role.unwrap_or_else(|| current.role()),
        );
        rows[index] = updated.clone();
        Ok(Some(updated))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, UserPersistenceError> {
        let mut rows = lock(&self.rows);
        let before = rows.len();
        rows.retain(|u| u.id() != id);
        Ok(rows.len() < before)
    }
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemoryProducts {
    rows: Mutex<Vec<Product>>,
}

impl InMemoryProducts {
    pub fn stock_of(&self, id: Uuid) -> Option<i32> {
        lock(&self.rows)
            .iter()
            .find(|p| p.id() == id)
            .map(|p| p.draft().stock())
    }

    fn with_stock(product: &Product, stock: i32) -> Product {
        let draft = product.draft();
        let replacement = ProductDraft::new(ProductDraftParts {
            name: draft.name().to_owned(),
            description: draft.description().map(str::to_owned),
            brand: draft.brand().map(str::to_owned),
            size: draft.size().map(str::to_owned),
            color: draft.color().map(str::to_owned),
            material: draft.material().map(str::to_owned),
            price_cents: draft.price_cents(),
            stock,
        })
        .expect("existing draft stays valid");
        Product::new(product.id(), replacement)
    }
}

#[async_trait]
impl ProductRepository for InMemoryProducts {
    async fn create(&self, draft: ProductDraft) -> Result<Product, ProductPersistenceError> {
        let product = Product::new(Uuid::new_v4(), draft);
        lock(&self.rows).push(product.clone());
        Ok(product)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, ProductPersistenceError> {
        Ok(lock(&self.rows).iter().find(|p| p.id() == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Product>, ProductPersistenceError> {
        Ok(lock(&self.rows).clone())
    }

    async fn search(&self, query: &str) -> Result<Vec<Product>, ProductPersistenceError> {
        let needle = query.to_lowercase();
        let matches = |field: Option<&str>| {
            field
                .map(|value| value.to_lowercase().contains(&needle))
                .unwrap_or(false)
        };
        Ok(lock(&self.rows)
            .iter()
            .filter(|p| {
                let draft = p.draft();
                matches(Some(draft.name())) || matches(draft.brand()) || matches(draft.description())
            })
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        id: Uuid,
        draft: ProductDraft,
    ) -> Result<Option<Product>, ProductPersistenceError> {
        let mut rows = lock(&self.rows);
        let Some(index) = rows.iter().position(|p| p.id() == id) else {
            return Ok(None);
        };
        let updated = Product::new(id, draft);
        rows[index] = updated.clone();
        Ok(Some(updated))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ProductPersistenceError> {
        let mut rows = lock(&self.rows);
        let before = rows.len();
        rows.retain(|p| p.id() != id);
        Ok(rows.len() < before)
    }
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

pub struct InMemoryOrders {
    rows: Mutex<Vec<Order>>,
    products: Arc<InMemoryProducts>,
}

impl InMemoryOrders {
    pub fn new(products: Arc<InMemoryProducts>) -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            products,
        }
    }

    pub fn insert(&self, order: Order) {
        lock(&self.rows).push(order);
    }

    pub fn contains(&self, id: Uuid) -> bool {
        lock(&self.rows).iter().any(|o| o.id() == id)
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrders {
    async fn place(
        &self,
        user_id: Uuid,
        lines: Vec<OrderLine>,
    ) -> Result<Order, OrderPersistenceError> {
        let mut products = lock(&self.products.rows);

        // First pass validates every line so a failure leaves stock untouched,
        // mirroring the transactional rollback of the real adapter.
        for line in &lines {
            let product = products
                .iter()
                .find(|p| p.id() == line.product_id())
                .ok_or_else(|| OrderPersistenceError::product_not_found(line.product_id()))?;
            if product.draft().stock() < line.quantity() {
                return Err(OrderPersistenceError::insufficient_stock(
                    product.id(),
                    product.draft().stock(),
                ));
            }
        }

        let order_id = Uuid::new_v4();
        let mut total_cents = 0i64;
        let mut items = Vec::with_capacity(lines.len());
        for line in &lines {
            let index = products
                .iter()
                .position(|p| p.id() == line.product_id())
                .expect("validated above");
            let unit_price_cents = products[index].draft().price_cents();
            let remaining = products[index].draft().stock() - line.quantity();
            products[index] = InMemoryProducts::with_stock(&products[index], remaining);

            total_cents += unit_price_cents * i64::from(line.quantity());
            items.push(
                OrderItem::new(
                    Uuid::new_v4(),
                    order_id,
                    line.product_id(),
                    line.quantity(),
                    unit_price_cents,
                )
                .expect("validated line"),
            );
        }

        let order = Order::new(order_id, user_id, OrderStatus::Pending, total_cents, items);
        lock(&self.rows).push(order.clone());
        Ok(order)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, OrderPersistenceError> {
        Ok(lock(&self.rows).iter().find(|o| o.id() == id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Order>, OrderPersistenceError> {
        Ok(lock(&self.rows).clone())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, OrderPersistenceError> {
        Ok(lock(&self.rows)
            .iter()
            .filter(|o| o.user_id() == user_id)
            .cloned()
            .collect())
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<Order>, OrderPersistenceError> {
        let mut rows = lock(&self.rows);
        let Some(index) = rows.iter().position(|o| o.id() == id) else {
            return Ok(None);
        };
        let current = &rows[index];
        let updated = Order::new(
            current.id(),
            current.user_id(),
            status,
            current.total_cents(),
            current.items().to_vec(),
        );
        rows[index] = updated.clone();
        Ok(Some(updated))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, OrderPersistenceError> {
        let mut rows = lock(&self.rows);
        let before = rows.len();
        rows.retain(|o| o.id() != id);
        Ok(rows.len() < before)
    }
}

// ---------------------------------------------------------------------------
// Order items
// ---------------------------------------------------------------------------

pub struct InMemoryOrderItems {
    rows: Mutex<Vec<OrderItem>>,
    orders: Arc<InMemoryOrders>,
    products: Arc<InMemoryProducts>,
}

impl InMemoryOrderItems {
    pub fn new(orders: Arc<InMemoryOrders>, products: Arc<InMemoryProducts>) -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            orders,
            products,
        }
    }

    pub fn insert(&self, item: OrderItem) {
        lock(&self.rows).push(item);
    }
}

#[async_trait]
impl OrderItemRepository for InMemoryOrderItems {
    async fn create(
        &self,
        new_item: NewOrderItem,
    ) -> Result<OrderItem, OrderItemPersistenceError> {
        if !self.orders.contains(new_item.order_id) {
            return Err(OrderItemPersistenceError::missing_parent(
                "order does not exist",
            ));
        }
        if self.products.stock_of(new_item.product_id).is_none() {
            return Err(OrderItemPersistenceError::missing_parent(
                "product does not exist",
            ));
        }
        let item = OrderItem::new(
            Uuid::new_v4(),
            new_item.order_id,
            new_item.product_id,
            new_item.quantity,
            new_item.unit_price_cents,
        )
        .map_err(|e| OrderItemPersistenceError::query(e.to_string()))?;
        lock(&self.rows).push(item.clone());
        Ok(item)
    }

    async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<OrderItem>, OrderItemPersistenceError> {
        Ok(lock(&self.rows).iter().find(|i| i.id() == id).cloned())
    }

    async fn list(&self) -> Result<Vec<OrderItem>, OrderItemPersistenceError> {
        Ok(lock(&self.rows).clone())
    }

    async fn update(
        &self,
        id: Uuid,
        changes: OrderItemChanges,
    ) -> Result<Option<OrderItem>, OrderItemPersistenceError> {
        let mut rows = lock(&self.rows);
        let Some(index) = rows.iter().position(|i| i.id() == id) else {
            return Ok(None);
        };
        let current = &rows[index];
        let updated = OrderItem::new(
            current.id(),
            current.order_id(),
            current.product_id(),
            changes.quantity.unwrap_or_else(|| current.quantity()),
            changes
                .unit_price_cents
                .unwrap_or_else(|| current.unit_price_cents()),
        )
        .map_err(|e| OrderItemPersistenceError::query(e.to_string()))?;
        rows[index] = updated.clone();
        Ok(Some(updated))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, OrderItemPersistenceError> {
        let mut rows = lock(&self.rows);
        let before = rows.len();
        rows.retain(|i| i.id() != id);
        Ok(rows.len() < before)
    }
}

// ---------------------------------------------------------------------------
// Security stubs
// ---------------------------------------------------------------------------

/// Deterministic hasher so tests can run without Argon2 work factors.
pub struct StubPasswordHasher;

impl PasswordHasher for StubPasswordHasher {
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHasherError> {
        PasswordHash::new(format!("stub:{password}"))
            .map_err(|e| PasswordHasherError::hashing(e.to_string()))
    }

    fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, PasswordHasherError> {
        Ok(hash.as_ref() == format!("stub:{password}"))
    }
}

/// Transparent token format: `<user_id>:<role>`.
pub struct StubTokenService;

impl TokenService for StubTokenService {
    fn issue(&self, subject: TokenSubject) -> Result<String, TokenServiceError> {
        Ok(format!("{}:{}", subject.user_id, subject.role))
    }

    fn verify(&self, token: &str) -> Result<TokenSubject, TokenServiceError> {
        let (user_id, role) = token.split_once(':').ok_or(TokenServiceError::Invalid)?;
        Ok(TokenSubject {
            user_id: user_id.parse().map_err(|_| TokenServiceError::Invalid)?,
            role: role.parse::<Role>().map_err(|_| TokenServiceError::Invalid)?,
        })
    }
}

// ---------------------------------------------------------------------------
// App assembly
// ---------------------------------------------------------------------------

/// In-memory backend: every port stubbed, stores shared with the test body.
pub struct TestBackend {
    pub users: Arc<InMemoryUsers>,
    pub products: Arc<InMemoryProducts>,
    pub orders: Arc<InMemoryOrders>,
    pub order_items: Arc<InMemoryOrderItems>,
    pub state: HttpState,
}

pub fn test_backend() -> TestBackend {
    let users = Arc::new(InMemoryUsers::default());
    let products = Arc::new(InMemoryProducts::default());
    let orders = Arc::new(InMemoryOrders::new(Arc::clone(&products)));
    let order_items = Arc::new(InMemoryOrderItems::new(
        Arc::clone(&orders),
        Arc::clone(&products),
    ));

    let state = HttpState {
        users: Arc::clone(&users) as Arc<dyn UserRepository>,
        products: Arc::clone(&products) as Arc<dyn ProductRepository>,
        orders: Arc::clone(&orders) as Arc<dyn OrderRepository>,
        order_items: Arc::clone(&order_items) as Arc<dyn OrderItemRepository>,
        password_hasher: Arc::new(StubPasswordHasher),
        tokens: Arc::new(StubTokenService),
    };

    TestBackend {
        users,
        products,
        orders,
        order_items,
        state,
    }
}

/// Build an actix test service with the versioned API mounted.
pub async fn init_app(
    state: HttpState,
) -> impl Service<Request, Response = ServiceResponse, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_api),
    )
    .await
}

/// Authorization header for the given seeded account.
pub fn bearer(user: &User) -> (&'static str, String) {
    (
        "Authorization",
        format!("Bearer {}:{}", user.id(), user.role()),
    )
}

/// Seed an account directly into the stub store and return it.
pub async fn seed_user(backend: &TestBackend, username: &str, email: &str, role: Role) -> User {
    backend
        .users
        .create(NewUser {
            username: backend::domain::Username::new(username).expect("valid username"),
            email: EmailAddress::new(email).expect("valid email"),
            password_hash: StubPasswordHasher
                .hash("a sensible password")
                .expect("hash"),
            role,
        })
        .await
        .expect("seed user")
}

/// Seed a catalogue product and return it.
pub async fn seed_product(
    backend: &TestBackend,
    name: &str,
    price_cents: i64,
    stock: i32,
) -> Product {
    backend
        .products
        .create(
            ProductDraft::new(ProductDraftParts {
                name: name.to_owned(),
                price_cents,
                stock,
                ..ProductDraftParts::default()
            })
            .expect("valid draft"),
        )
        .await
        .expect("seed product")
}
