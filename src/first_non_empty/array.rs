use core::fmt;

use super::vec::FirstNonEmpty;
use super::FirstNonEmpty as FirstNonEmptyTrait;
use crate::flow::Publisher;
use crate::Error;

impl<P, const N: usize> FirstNonEmptyTrait for [P; N]
where
    P: Publisher,
    P::Item: Send + 'static,
    P::Error: From<Error> + fmt::Debug + Send + 'static,
{
    type Item = P::Item;
    type Error = P::Error;
    type Publisher = FirstNonEmpty<P>;

    fn first_non_empty(self) -> Self::Publisher {
        FirstNonEmpty::new(Vec::from(self))
    }
}
