use crate::handler::{BoxHandler, Handler};

/// Anything that can be registered as the handler list of a route.
///
/// Implemented for a single handler, tuples of up to four handlers, and
/// `Vec<BoxHandler>` for lists built at runtime.
pub trait IntoHandlers {
    fn into_handlers(self) -> Vec<BoxHandler>;
}

impl<H: Handler + 'static> IntoHandlers for H {
    fn into_handlers(self) -> Vec<BoxHandler> {
        vec![Box::new(self)]
    }
}

impl IntoHandlers for Vec<BoxHandler> {
    fn into_handlers(self) -> Vec<BoxHandler> {
        self
    }
}

macro_rules! tuple_into_handlers {
    ($($handler:ident),+) => {
        impl<$($handler: Handler + 'static),+> IntoHandlers for ($($handler,)+) {
            #[allow(non_snake_case, reason = "type parameters double as bindings")]
            fn into_handlers(self) -> Vec<BoxHandler> {
                let ($($handler,)+) = self;
                vec![$(Box::new($handler) as BoxHandler),+]
            }
        }
    };
}

tuple_into_handlers!(H1);
tuple_into_handlers!(H1, H2);
tuple_into_handlers!(H1, H2, H3);
tuple_into_handlers!(H1, H2, H3, H4);
