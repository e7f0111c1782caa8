pub mod sales_order;

pub use sales_order::{
    CreateSalesOrderRequest, SalesOrder, SalesOrderDetail, SalesOrderStatus,
    SalesOrderStatusRequest,
};
