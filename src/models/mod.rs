mod movie;
mod notice;
mod search;

pub use movie::{Movie, MovieId};
pub use notice::{
    Notice, NoticeLevel, Notifier, EMPTY_QUERY_MESSAGE, FETCH_FAILED_MESSAGE, NO_RESULTS_MESSAGE,
};
pub use search::{FetchKey, FetchTicket, MoviesResponse, SearchResult};
