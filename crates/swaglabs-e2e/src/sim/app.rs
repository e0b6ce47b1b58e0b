//! Storefront application model: state, rendering and click/fill handling.

use std::time::Duration;

use crate::data::{CheckoutField, CheckoutInfo, Price, Product, SortOrder};
use crate::result::{E2eError, E2eResult};

use super::dom::{Action, Binding, Node};

/// Password shared by every storefront account
pub const STORE_PASSWORD: &str = "secret_sauce";

/// Where `About` in the side menu leads
pub const ABOUT_URL: &str = "https://saucelabs.com/";

/// Screens of the storefront
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Login,
    Inventory,
    Cart,
    CheckoutStepOne,
    CheckoutStepTwo,
    CheckoutComplete,
    /// Left the storefront (About link)
    External,
}

impl Screen {
    const ROUTES: [(Self, &'static str); 6] = [
        (Self::Login, ""),
        (Self::Inventory, "inventory.html"),
        (Self::Cart, "cart.html"),
        (Self::CheckoutStepOne, "checkout-step-one.html"),
        (Self::CheckoutStepTwo, "checkout-step-two.html"),
        (Self::CheckoutComplete, "checkout-complete.html"),
    ];

    /// Path below the base URL (empty for the login screen)
    pub fn path(self) -> &'static str {
        Self::ROUTES
            .iter()
            .find(|(screen, _)| *screen == self)
            .map_or("", |(_, path)| path)
    }

    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.trim_start_matches('/');
        let path = path.strip_prefix("index.html").unwrap_or(path);
        Self::ROUTES
            .iter()
            .find(|(_, p)| *p == path)
            .map(|(screen, _)| *screen)
    }

    pub const fn requires_login(self) -> bool {
        !matches!(self, Self::Login | Self::External)
    }

    const fn title(self) -> &'static str {
        match self {
            Self::Inventory => "Products",
            Self::Cart => "Your Cart",
            Self::CheckoutStepOne => "Checkout: Your Information",
            Self::CheckoutStepTwo => "Checkout: Overview",
            Self::CheckoutComplete => "Checkout: Complete!",
            Self::Login | Self::External => "",
        }
    }
}

/// How the storefront treats an account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKind {
    Standard,
    LockedOut,
    /// Broken product sorting
    Problem,
    /// Slow login
    PerformanceGlitch,
}

/// An account the storefront accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub username: String,
    pub kind: AccountKind,
}

impl Account {
    fn new(username: &str, kind: AccountKind) -> Self {
        Self {
            username: username.to_string(),
            kind,
        }
    }

    /// The storefront's built-in accounts
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("standard_user", AccountKind::Standard),
            Self::new("locked_out_user", AccountKind::LockedOut),
            Self::new("problem_user", AccountKind::Problem),
            Self::new("performance_glitch_user", AccountKind::PerformanceGlitch),
        ]
    }
}

/// Side effects the driver must apply after a state transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    Delay(Duration),
}

/// Mutable application state for one browser session
#[derive(Debug, Clone)]
pub struct Storefront {
    base_url: String,
    products: Vec<Product>,
    accounts: Vec<Account>,
    glitch_delay: Duration,

    screen: Screen,
    user: Option<Account>,
    username_input: String,
    password_input: String,
    login_error: Option<String>,
    cart: Vec<u32>,
    sort: SortOrder,
    menu_open: bool,
    checkout: CheckoutInfo,
    checkout_error: Option<String>,
}

impl Storefront {
    pub fn new(
        base_url: &str,
        products: Vec<Product>,
        accounts: Vec<Account>,
        glitch_delay: Duration,
    ) -> Self {
        Self {
            base_url: normalize_base(base_url),
            products,
            accounts,
            glitch_delay,
            screen: Screen::External,
            user: None,
            username_input: String::new(),
            password_input: String::new(),
            login_error: None,
            cart: Vec::new(),
            sort: SortOrder::default(),
            menu_open: false,
            checkout: CheckoutInfo::default(),
            checkout_error: None,
        }
    }

    pub const fn screen(&self) -> Screen {
        self.screen
    }

    pub fn cart(&self) -> &[u32] {
        &self.cart
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self) -> String {
        match self.screen {
            Screen::External => ABOUT_URL.to_string(),
            screen => format!("{}{}", self.base_url, screen.path()),
        }
    }

    /// Handle `page.goto(url)`
    pub fn navigate(&mut self, url: &str) -> E2eResult<()> {
        let path = url.strip_prefix(self.base_url.as_str()).or_else(|| {
            (url == self.base_url.trim_end_matches('/')).then_some("")
        });
        let Some(path) = path else {
            return Err(E2eError::Navigation {
                url: url.to_string(),
                message: format!("host outside {}", self.base_url),
            });
        };
        let Some(screen) = Screen::from_path(path) else {
            return Err(E2eError::Navigation {
                url: url.to_string(),
                message: "404 Not Found".into(),
            });
        };

        self.menu_open = false;
        if screen.requires_login() && self.user.is_none() {
            self.login_error = Some(format!(
                "Epic sadface: You can only access '/{}' when you are logged in.",
                screen.path()
            ));
            self.show_login();
            return Ok(());
        }
        if screen == Screen::Login {
            self.login_error = None;
            self.show_login();
        } else {
            self.enter(screen);
        }
        Ok(())
    }

    fn enter(&mut self, screen: Screen) {
        if screen == Screen::CheckoutStepOne {
            self.checkout = CheckoutInfo::default();
            self.checkout_error = None;
        }
        self.menu_open = false;
        self.screen = screen;
    }

    fn show_login(&mut self) {
        self.username_input.clear();
        self.password_input.clear();
        self.screen = Screen::Login;
    }

    /// Handle typing into a bound control
    pub fn fill(&mut self, binding: Binding, text: &str) -> E2eResult<()> {
        let slot = match binding {
            Binding::Username => &mut self.username_input,
            Binding::Password => &mut self.password_input,
            Binding::FirstName => &mut self.checkout.first_name,
            Binding::LastName => &mut self.checkout.last_name,
            Binding::PostalCode => &mut self.checkout.postal_code,
            Binding::Sort => {
                return Err(E2eError::NotInteractable {
                    selector: "select.product_sort_container".into(),
                    action: "filled",
                    reason: "element is not an <input>".into(),
                })
            }
        };
        *slot = text.to_string();
        Ok(())
    }

    /// Handle choosing a `<select>` option
    pub fn select(&mut self, binding: Binding, value: &str) -> E2eResult<()> {
        if binding != Binding::Sort {
            return Err(E2eError::NotInteractable {
                selector: format!("{binding:?}"),
                action: "selected",
                reason: "element is not a <select>".into(),
            });
        }
        let order: SortOrder = value.parse()?;
        // problem_user's dropdown changes but the list never re-sorts
        if self.user.as_ref().map(|u| u.kind) != Some(AccountKind::Problem) {
            self.sort = order;
        }
        Ok(())
    }

    /// Handle a click on a node carrying `action`
    pub fn click(&mut self, action: Action) -> Effect {
        match action {
            Action::Login => return self.submit_login(),
            Action::OpenMenu => self.menu_open = true,
            Action::CloseMenu => self.menu_open = false,
            Action::AllItems | Action::ContinueShopping | Action::CancelOverview | Action::BackHome => {
                self.enter(Screen::Inventory);
            }
            Action::About => self.screen = Screen::External,
            Action::Logout => {
                self.user = None;
                self.menu_open = false;
                self.login_error = None;
                self.show_login();
            }
            Action::ResetAppState => {
                self.cart.clear();
                self.sort = SortOrder::default();
            }
            Action::OpenCart | Action::CancelInformation => self.enter(Screen::Cart),
            Action::AddToCart(id) => {
                if !self.cart.contains(&id) {
                    self.cart.push(id);
                }
            }
            Action::RemoveFromCart(id) => self.cart.retain(|item| *item != id),
            Action::Checkout => self.enter(Screen::CheckoutStepOne),
            Action::ContinueInformation => match self.checkout.first_missing_field() {
                Some(field) => self.checkout_error = Some(field.required_message().to_string()),
                None => {
                    self.checkout_error = None;
                    self.screen = Screen::CheckoutStepTwo;
                }
            },
            Action::Finish => {
                self.cart.clear();
                self.enter(Screen::CheckoutComplete);
            }
        }
        Effect::None
    }

    fn submit_login(&mut self) -> Effect {
        let error = if self.username_input.is_empty() {
            Some("Epic sadface: Username is required")
        } else if self.password_input.is_empty() {
            Some("Epic sadface: Password is required")
        } else {
            None
        };
        if let Some(message) = error {
            self.login_error = Some(message.to_string());
            return Effect::None;
        }

        let account = self
            .accounts
            .iter()
            .find(|a| a.username == self.username_input)
            .filter(|_| self.password_input == STORE_PASSWORD)
            .cloned();
        match account {
            None => {
                self.login_error = Some(
                    "Epic sadface: Username and password do not match any user in this service"
                        .to_string(),
                );
                Effect::None
            }
            Some(account) if account.kind == AccountKind::LockedOut => {
                self.login_error =
                    Some("Epic sadface: Sorry, this user has been locked out.".to_string());
                Effect::None
            }
            Some(account) => {
                let effect = if account.kind == AccountKind::PerformanceGlitch {
                    Effect::Delay(self.glitch_delay)
                } else {
                    Effect::None
                };
                self.user = Some(account);
                self.login_error = None;
                self.enter(Screen::Inventory);
                effect
            }
        }
    }

    fn sorted_products(&self) -> Vec<&Product> {
        let mut products: Vec<&Product> = self.products.iter().collect();
        match self.sort {
            SortOrder::NameAsc => products.sort_by(|a, b| a.name.cmp(&b.name)),
            SortOrder::NameDesc => products.sort_by(|a, b| b.name.cmp(&a.name)),
            SortOrder::PriceAsc => products.sort_by_key(|p| p.price),
            SortOrder::PriceDesc => products.sort_by(|a, b| b.price.cmp(&a.price)),
        }
        products
    }

    fn cart_products(&self) -> Vec<&Product> {
        self.cart
            .iter()
            .filter_map(|id| self.products.iter().find(|p| p.id == *id))
            .collect()
    }

    /// Build the DOM for the current state
    pub fn render(&self) -> Node {
        let body = match self.screen {
            Screen::Login => vec![self.render_login()],
            Screen::External => vec![Node::new("main").text("Sauce Labs")],
            screen => {
                let content = match screen {
                    Screen::Inventory => self.render_inventory(),
                    Screen::Cart => self.render_cart(),
                    Screen::CheckoutStepOne => self.render_information(),
                    Screen::CheckoutStepTwo => self.render_overview(),
                    _ => render_complete(),
                };
                vec![Node::new("div")
                    .id("page_wrapper")
                    .class("page_wrapper")
                    .child(self.render_header(screen))
                    .child(content)]
            }
        };
        Node::new("html").child(
            Node::new("body").child(Node::new("div").id("root").children(body)),
        )
    }

    fn render_login(&self) -> Node {
        let error = self.login_error.as_ref().map(|message| {
            Node::new("div")
                .class("error-message-container error")
                .child(Node::new("h3").test_id("error").text(message.clone()))
                .child(Node::new("button").class("error-button").test_id("error-button"))
        });
        let form = Node::new("form")
            .child(
                Node::new("input")
                    .id("user-name")
                    .class("input_error form_input")
                    .test_id("username")
                    .attr("placeholder", "Username")
                    .attr("value", self.username_input.clone())
                    .bind(Binding::Username),
            )
            .child(
                Node::new("input")
                    .id("password")
                    .class("input_error form_input")
                    .test_id("password")
                    .attr("type", "password")
                    .attr("placeholder", "Password")
                    .attr("value", self.password_input.clone())
                    .bind(Binding::Password),
            )
            .children(error)
            .child(
                Node::new("input")
                    .id("login-button")
                    .class("submit-button btn_action")
                    .test_id("login-button")
                    .attr("type", "submit")
                    .attr("value", "Login")
                    .on_click(Action::Login),
            );
        Node::new("div")
            .class("login_wrapper")
            .child(Node::new("div").class("login_logo").text("Swag Labs"))
            .child(Node::new("div").class("login_wrapper-inner").child(form))
    }

    fn render_header(&self, screen: Screen) -> Node {
        let menu_link = |id: &str, text: &str, action: Action| {
            Node::new("a")
                .id(id)
                .class("bm-item menu-item")
                .test_id(id.replace('_', "-"))
                .text(text)
                .on_click(action)
        };
        let menu = Node::new("div")
            .class("bm-menu-wrap")
            .hidden(!self.menu_open)
            .child(
                Node::new("nav")
                    .class("bm-item-list")
                    .child(menu_link("inventory_sidebar_link", "All Items", Action::AllItems))
                    .child(menu_link("about_sidebar_link", "About", Action::About))
                    .child(menu_link("logout_sidebar_link", "Logout", Action::Logout))
                    .child(menu_link("reset_sidebar_link", "Reset App State", Action::ResetAppState)),
            )
            .child(
                Node::new("div").class("bm-cross-button").child(
                    Node::new("button")
                        .id("react-burger-cross-btn")
                        .text("Close Menu")
                        .on_click(Action::CloseMenu),
                ),
            );
        let badge = (!self.cart.is_empty()).then(|| {
            Node::new("span")
                .class("shopping_cart_badge")
                .test_id("shopping-cart-badge")
                .text(self.cart.len().to_string())
        });
        let primary = Node::new("div")
            .class("primary_header")
            .child(
                Node::new("div")
                    .id("menu_button_container")
                    .child(
                        Node::new("button")
                            .id("react-burger-menu-btn")
                            .text("Open Menu")
                            .on_click(Action::OpenMenu),
                    )
                    .child(menu),
            )
            .child(Node::new("div").class("app_logo").text("Swag Labs"))
            .child(
                Node::new("div")
                    .id("shopping_cart_container")
                    .class("shopping_cart_container")
                    .child(
                        Node::new("a")
                            .class("shopping_cart_link")
                            .test_id("shopping-cart-link")
                            .on_click(Action::OpenCart)
                            .children(badge),
                    ),
            );

        let mut secondary = Node::new("div")
            .class("header_secondary_container")
            .child(Node::new("span").class("title").test_id("title").text(screen.title()));
        if screen == Screen::Inventory {
            secondary = secondary.child(self.render_sort());
        }
        Node::new("div")
            .id("header_container")
            .class("header_container")
            .child(primary)
            .child(secondary)
    }

    fn render_sort(&self) -> Node {
        let options = SortOrder::ALL
            .into_iter()
            .map(|order| Node::new("option").attr("value", order.value()).text(order.label()));
        Node::new("div").class("right_component").child(
            Node::new("span")
                .class("select_container")
                .child(
                    Node::new("span")
                        .class("active_option")
                        .test_id("active-option")
                        .text(self.sort.label()),
                )
                .child(
                    Node::new("select")
                        .class("product_sort_container")
                        .test_id("product-sort-container")
                        .attr("value", self.sort.value())
                        .bind(Binding::Sort)
                        .children(options),
                ),
        )
    }

    fn render_inventory(&self) -> Node {
        let items = self.sorted_products().into_iter().map(|product| {
            let in_cart = self.cart.contains(&product.id);
            let button = if in_cart {
                Node::new("button")
                    .class("btn btn_secondary btn_small btn_inventory")
                    .test_id(format!("remove-{}", product.slug()))
                    .text("Remove")
                    .on_click(Action::RemoveFromCart(product.id))
            } else {
                Node::new("button")
                    .class("btn btn_primary btn_small btn_inventory")
                    .test_id(format!("add-to-cart-{}", product.slug()))
                    .text("Add to cart")
                    .on_click(Action::AddToCart(product.id))
            };
            Node::new("div")
                .class("inventory_item")
                .test_id("inventory-item")
                .child(Node::new("div").class("inventory_item_img"))
                .child(
                    Node::new("div")
                        .class("inventory_item_description")
                        .child(item_label(product))
                        .child(
                            Node::new("div")
                                .class("pricebar")
                                .child(price_node(product.price))
                                .child(button),
                        ),
                )
        });
        Node::new("div").id("inventory_container").class("inventory_container").child(
            Node::new("div")
                .class("inventory_list")
                .test_id("inventory-list")
                .children(items),
        )
    }

    fn render_cart_items(&self, removable: bool) -> Vec<Node> {
        self.cart_products()
            .into_iter()
            .map(|product| {
                let remove = removable.then(|| {
                    Node::new("button")
                        .class("btn btn_secondary btn_small cart_button")
                        .test_id(format!("remove-{}", product.slug()))
                        .text("Remove")
                        .on_click(Action::RemoveFromCart(product.id))
                });
                Node::new("div")
                    .class("cart_item")
                    .test_id("inventory-item")
                    .child(Node::new("div").class("cart_quantity").test_id("item-quantity").text("1"))
                    .child(
                        Node::new("div")
                            .class("cart_item_label")
                            .child(item_label(product))
                            .child(
                                Node::new("div")
                                    .class("item_pricebar")
                                    .child(price_node(product.price))
                                    .children(remove),
                            ),
                    )
            })
            .collect()
    }

    fn render_cart(&self) -> Node {
        Node::new("div")
            .id("cart_contents_container")
            .child(
                Node::new("div")
                    .class("cart_list")
                    .test_id("cart-list")
                    .child(Node::new("div").class("cart_quantity_label").text("QTY"))
                    .child(Node::new("div").class("cart_desc_label").text("Description"))
                    .children(self.render_cart_items(true)),
            )
            .child(
                Node::new("div")
                    .class("cart_footer")
                    .child(
                        Node::new("button")
                            .id("continue-shopping")
                            .class("btn btn_secondary back btn_medium")
                            .test_id("continue-shopping")
                            .text("Continue Shopping")
                            .on_click(Action::ContinueShopping),
                    )
                    .child(
                        Node::new("button")
                            .id("checkout")
                            .class("btn btn_action btn_medium checkout_button")
                            .test_id("checkout")
                            .text("Checkout")
                            .on_click(Action::Checkout),
                    ),
            )
    }

    fn render_information(&self) -> Node {
        let input = |field: CheckoutField, id: &str, placeholder: &str, binding: Binding| {
            Node::new("input")
                .id(id)
                .class("input_error form_input")
                .test_id(field.test_id())
                .attr("placeholder", placeholder)
                .attr("value", self.checkout.field(field).to_string())
                .bind(binding)
        };
        let error = self.checkout_error.as_ref().map(|message| {
            Node::new("div")
                .class("error-message-container error")
                .child(Node::new("h3").test_id("error").text(message.clone()))
        });
        Node::new("div").id("checkout_info_container").class("checkout_info_container").child(
            Node::new("form")
                .child(
                    Node::new("div")
                        .class("checkout_info")
                        .child(input(CheckoutField::FirstName, "first-name", "First Name", Binding::FirstName))
                        .child(input(CheckoutField::LastName, "last-name", "Last Name", Binding::LastName))
                        .child(input(CheckoutField::PostalCode, "postal-code", "Zip/Postal Code", Binding::PostalCode))
                        .children(error),
                )
                .child(
                    Node::new("div")
                        .class("checkout_buttons")
                        .child(
                            Node::new("button")
                                .id("cancel")
                                .class("btn btn_secondary back btn_medium cart_cancel_link")
                                .test_id("cancel")
                                .text("Cancel")
                                .on_click(Action::CancelInformation),
                        )
                        .child(
                            Node::new("input")
                                .id("continue")
                                .class("submit-button btn btn_primary cart_button btn_action")
                                .test_id("continue")
                                .attr("type", "submit")
                                .attr("value", "Continue")
                                .on_click(Action::ContinueInformation),
                        ),
                ),
        )
    }

    fn render_overview(&self) -> Node {
        let subtotal: Price = self.cart_products().iter().map(|p| p.price).sum();
        let tax = subtotal.tax();
        let label = |class: &str, text: &str| Node::new("div").class(class).text(text);
        let summary = Node::new("div")
            .class("summary_info")
            .child(label("summary_info_label payment_info_label", "Payment Information:"))
            .child(label("summary_value_label", "SauceCard #31337"))
            .child(label("summary_info_label shipping_info_label", "Shipping Information:"))
            .child(label("summary_value_label", "Free Pony Express Delivery!"))
            .child(label("summary_info_label", "Price Total"))
            .child(label("summary_subtotal_label", &format!("Item total: {subtotal}")))
            .child(label("summary_tax_label", &format!("Tax: {tax}")))
            .child(label(
                "summary_info_label summary_total_label",
                &format!("Total: {}", subtotal + tax),
            ))
            .child(
                Node::new("div")
                    .class("cart_footer")
                    .child(
                        Node::new("button")
                            .id("cancel")
                            .class("btn btn_secondary back btn_medium cart_cancel_link")
                            .test_id("cancel")
                            .text("Cancel")
                            .on_click(Action::CancelOverview),
                    )
                    .child(
                        Node::new("button")
                            .id("finish")
                            .class("btn btn_action btn_medium cart_button")
                            .test_id("finish")
                            .text("Finish")
                            .on_click(Action::Finish),
                    ),
            );
        Node::new("div")
            .id("checkout_summary_container")
            .class("checkout_summary_container")
            .child(
                Node::new("div")
                    .class("cart_list")
                    .children(self.render_cart_items(false)),
            )
            .child(summary)
    }
}

fn render_complete() -> Node {
    Node::new("div")
        .id("checkout_complete_container")
        .class("checkout_complete_container")
        .child(Node::new("img").class("pony_express"))
        .child(
            Node::new("h2")
                .class("complete-header")
                .test_id("complete-header")
                .text("Thank you for your order!"),
        )
        .child(
            Node::new("div")
                .class("complete-text")
                .test_id("complete-text")
                .text("Your order has been dispatched, and will arrive just as fast as the pony can get there!"),
        )
        .child(
            Node::new("button")
                .id("back-to-products")
                .class("btn btn_primary btn_small")
                .test_id("back-to-products")
                .text("Back Home")
                .on_click(Action::BackHome),
        )
}

fn item_label(product: &Product) -> Node {
    Node::new("div")
        .class("inventory_item_label")
        .child(
            Node::new("a").id(format!("item_{}_title_link", product.id)).child(
                Node::new("div")
                    .class("inventory_item_name")
                    .test_id("inventory-item-name")
                    .text(product.name.clone()),
            ),
        )
        .child(
            Node::new("div")
                .class("inventory_item_desc")
                .test_id("inventory-item-desc")
                .text(product.description.clone()),
        )
}

fn price_node(price: Price) -> Node {
    Node::new("div")
        .class("inventory_item_price")
        .test_id("inventory-item-price")
        .text(price.to_string())
}

fn normalize_base(base_url: &str) -> String {
    format!("{}/", base_url.trim_end_matches('/'))
}
