pub const ITEMS_PER_PAGE: i64 = 10;

/// Pagination data for the index view: the limit/offset for the store query
/// and the page links the template renders.
#[derive(Debug, Clone, PartialEq)]
pub struct Paginate {
    pub count: i64,
    pub items_per_page: i64,
    pub pageno: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageLink {
    pub number: u32,
    pub current: bool,
}

impl Paginate {
    pub fn new(count: i64, pageno: u32) -> Self {
        Self {
            count,
            items_per_page: ITEMS_PER_PAGE,
            pageno,
        }
    }

    pub fn limit(&self) -> i64 {
        self.items_per_page
    }

    pub fn offset(&self) -> i64 {
        self.items_per_page * (i64::from(self.pageno) - 1)
    }

    pub fn total_pages(&self) -> u32 {
        ((self.count + self.items_per_page - 1) / self.items_per_page).max(1) as u32
    }

    pub fn pages(&self) -> Vec<PageLink> {
        (1..=self.total_pages())
            .map(|number| PageLink {
                number,
                current: number == self.pageno,
            })
            .collect()
    }

    /// The control is only rendered when there is more than one page.
    pub fn needed(&self) -> bool {
        self.count > self.items_per_page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn third_page_of_twenty_five() {
        let paginate = Paginate::new(25, 3);
        assert_eq!(paginate.offset(), 20);
        assert_eq!(paginate.limit(), 10);
        assert_eq!(paginate.total_pages(), 3);
        assert!(paginate.needed());
    }

    #[test]
    fn empty_listing_still_has_one_page() {
        let paginate = Paginate::new(0, 1);
        assert_eq!(paginate.offset(), 0);
        assert_eq!(paginate.total_pages(), 1);
        assert!(!paginate.needed());
    }

    #[test]
    fn page_links_mark_the_current_page() {
        let pages = Paginate::new(25, 2).pages();
        assert_eq!(pages.len(), 3);
        assert!(!pages[0].current);
        assert!(pages[1].current);
        assert_eq!(pages[2].number, 3);
    }

    #[test]
    fn exact_multiple_has_no_extra_page() {
        assert_eq!(Paginate::new(20, 1).total_pages(), 2);
    }
}
